//! Append-only journal of routine edits.
//!
//! Purely observational: nothing in the engine reads it back. The driver dumps it on
//! shutdown.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, OnceLock},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub date: DateTime<Utc>,
    pub description: String,
}

impl Event {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            date: Utc::now(),
            description: description.into(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.date, self.description)
    }
}

/// Cloneable handle onto a shared event sequence.
pub struct EventLog {
    inner: Arc<Mutex<Vec<Event>>>,
}

static GLOBAL: OnceLock<EventLog> = OnceLock::new();

impl EventLog {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The process-wide log every routine journals to unless given another one.
    pub fn global() -> EventLog {
        GLOBAL.get_or_init(EventLog::new).clone()
    }

    pub fn log_event(&self, description: impl Into<String>) {
        let event = Event::new(description);
        log::debug!("event: {}", event.description);
        self.lock().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.lock().clone()
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.lock()
            .iter()
            .map(|event| event.description.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Every event rendered in order, separated by blank lines.
    pub fn dump(&self) -> String {
        self.lock()
            .iter()
            .map(|event| event.to_string())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Event>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventLog {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog").field("len", &self.len()).finish()
    }
}
