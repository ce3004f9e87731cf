mod journal;

pub use journal::{Event, EventLog};
