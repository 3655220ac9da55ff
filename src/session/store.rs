//! Persistence of session snapshots across restarts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::state::Session;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Opaque storage for one session snapshot.
pub trait SessionStore {
    /// Returns the saved snapshot, or `None` if nothing is stored.
    fn load(&mut self) -> Result<Option<Session>, StoreError>;

    fn save(&mut self, session: &Session) -> Result<(), StoreError>;

    fn clear(&mut self) -> Result<(), StoreError>;
}

/// Keeps the snapshot as a JSON string in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored JSON, if any.
    pub fn raw(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }

    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            snapshot: Some(raw.into()),
        }
    }
}

impl SessionStore for MemoryStore {
    fn load(&mut self) -> Result<Option<Session>, StoreError> {
        self.snapshot
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(StoreError::from)
    }

    fn save(&mut self, session: &Session) -> Result<(), StoreError> {
        self.snapshot = Some(serde_json::to_string(session)?);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.snapshot = None;
        Ok(())
    }
}

/// Stores the snapshot in a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStore for JsonFileStore {
    fn load(&mut self) -> Result<Option<Session>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, session: &Session) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(session)?;
        let temp = self.temp_path();
        fs::write(&temp, json)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mode;
    use crate::session::Phase;

    fn temp_store(name: &str) -> JsonFileStore {
        let path = std::env::temp_dir().join(format!(
            "snapquiz-store-{}-{}.json",
            std::process::id(),
            name
        ));
        let _ = fs::remove_file(&path);
        JsonFileStore::new(path)
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());

        let mut session = Session::new(Mode::Timed);
        session.phase = Phase::Loading;
        session.attempt = 2;
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        assert!(store.raw().is_none());
    }

    #[test]
    fn test_memory_store_reports_corrupt_snapshot() {
        let mut store = MemoryStore::with_raw("{ nope");
        assert!(matches!(store.load(), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_file_store_round_trip() {
        let mut store = temp_store("round-trip");
        assert!(store.load().unwrap().is_none());

        let mut session = Session::new(Mode::FourImage);
        session.images = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        store.save(&session).unwrap();
        assert!(store.path().exists());
        assert_eq!(store.load().unwrap(), Some(session.clone()));

        session.current_image_index = 3;
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }
}
