use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};

use super::codec::{decode, encode_pretty};
use crate::error::{Result, RoutineError};
use crate::models::Routine;

pub const DEFAULT_ROUTINES_DIR: &str = "data/savedroutines";

/// Directory of saved routines, one `<routine-name>.json` file each.
#[derive(Debug, Clone)]
pub struct RoutineStore {
    root: PathBuf,
}

impl RoutineStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Display names of every saved routine, sorted. A missing directory lists as empty.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(RoutineError::io(&self.root, err)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|err| RoutineError::io(&self.root, err))?.path();
            if !path.is_file() || path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn load(&self, name: &str) -> Result<Routine> {
        let path = self.path_for(name)?;
        let contents = fs::read_to_string(&path).map_err(|err| RoutineError::io(&path, err))?;
        let routine = decode(&contents)?;
        debug!("Loaded routine '{}' from {}", name, path.display());
        Ok(routine)
    }

    /// Writes the routine under its own name, replacing any earlier save.
    pub fn save(&self, routine: &Routine) -> Result<PathBuf> {
        let path = self.path_for(routine.name())?;
        fs::create_dir_all(&self.root).map_err(|err| RoutineError::io(&self.root, err))?;
        let contents = encode_pretty(routine)?;
        fs::write(&path, contents).map_err(|err| RoutineError::io(&path, err))?;
        info!("Saved routine '{}' to {}", routine.name(), path.display());
        Ok(path)
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name)?;
        fs::remove_file(&path).map_err(|err| RoutineError::io(&path, err))?;
        info!("Deleted routine '{}'", name);
        Ok(())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).map_or(false, |path| path.is_file())
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(RoutineError::precondition(format!(
                "'{name}' cannot be used as a routine file name"
            )));
        }
        Ok(self.root.join(format!("{name}.json")))
    }
}

impl Default for RoutineStore {
    fn default() -> Self {
        Self::new(DEFAULT_ROUTINES_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;
    use crate::models::{Segment, SegmentGroup};

    fn sample(name: &str) -> Routine {
        let mut routine = Routine::with_event_log(name, EventLog::new());
        routine.add(Segment::time("run", 90_000));
        routine.add(Segment::manual("stretch"));
        routine
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = RoutineStore::new(dir.path().join("savedroutines"));

        let mut routine = sample("morning");
        routine.advance(30_000);
        let path = store.save(&routine).unwrap();
        assert_eq!(path, dir.path().join("savedroutines/morning.json"));
        assert!(store.exists("morning"));

        let loaded = store.load("morning").unwrap();
        assert_eq!(loaded, routine);
        assert_eq!(
            loaded.segments()[0].as_time().unwrap().current_ms(),
            30_000
        );
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = RoutineStore::new(dir.path());

        store.save(&sample("legs")).unwrap();
        let mut changed = sample("legs");
        changed.add(Segment::time("cool down", 120_000));
        store.save(&changed).unwrap();

        assert_eq!(store.load("legs").unwrap().segments().len(), 3);
        assert_eq!(store.list().unwrap(), vec!["legs"]);
    }

    #[test]
    fn test_list_only_json_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let store = RoutineStore::new(dir.path());

        store.save(&sample("zeta")).unwrap();
        store.save(&sample("alpha")).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("folder.json")).unwrap();

        assert_eq!(store.list().unwrap(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_list_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = RoutineStore::new(dir.path().join("nowhere"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = RoutineStore::new(dir.path());
        store.save(&sample("gone")).unwrap();

        store.delete("gone").unwrap();
        assert!(!store.exists("gone"));
        assert!(matches!(store.delete("gone"), Err(RoutineError::Io { .. })));
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = RoutineStore::new(dir.path());

        assert!(matches!(store.load("absent"), Err(RoutineError::Io { .. })));

        fs::write(dir.path().join("broken.json"), "{\"name\": \"broken\"}").unwrap();
        assert!(matches!(store.load("broken"), Err(RoutineError::Decode(_))));
    }

    #[test]
    fn test_rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = RoutineStore::new(dir.path());
        assert!(matches!(
            store.load("../escape"),
            Err(RoutineError::PreconditionViolation(_))
        ));
        assert!(!store.exists(""));
    }
}
