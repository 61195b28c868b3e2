//! Durable backends for [`AttendanceState`].
//!
//! Every save is a full-state overwrite. The file backend writes a sibling
//! temp file and renames it into place, so readers only ever see a complete
//! document.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::state::AttendanceState;
use crate::error::StoreError;

pub trait StateStore {
    /// `Ok(None)` means nothing has been saved yet.
    fn load(&self) -> Result<Option<AttendanceState>, StoreError>;

    fn save(&self, state: &AttendanceState) -> Result<(), StoreError>;
}

/// Pretty-printed JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "attendance.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<AttendanceState>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let state = serde_json::from_str(&content)?;
        Ok(Some(state))
    }

    fn save(&self, state: &AttendanceState) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(state)?;
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let tmp = self.temp_path();
        std::fs::write(&tmp, content).map_err(write_err)?;
        std::fs::rename(&tmp, &self.path).map_err(write_err)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    saved: Option<AttendanceState>,
    fail_writes: bool,
    writes: usize,
}

/// In-process store. Clones share the same backing slot, so a test can keep
/// a handle after moving one into a [`crate::Ledger`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: AttendanceState) -> Self {
        let store = Self::default();
        if let Ok(mut inner) = store.inner.lock() {
            inner.saved = Some(state);
        }
        store
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_writes = fail;
        }
    }

    pub fn snapshot(&self) -> Option<AttendanceState> {
        self.inner.lock().ok().and_then(|inner| inner.saved.clone())
    }

    /// Successful saves so far.
    pub fn writes(&self) -> usize {
        self.inner.lock().map(|inner| inner.writes).unwrap_or(0)
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<AttendanceState>, StoreError> {
        let inner = self
            .inner
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(inner.saved.clone())
    }

    fn save(&self, state: &AttendanceState) -> Result<(), StoreError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        if inner.fail_writes {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        inner.saved = Some(state.clone());
        inner.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_state() -> AttendanceState {
        let mut state = AttendanceState::default();
        state.staff.add("u2".into());
        state.staff.add("u1".into());
        let day = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        state.attendance.merge_day(day, ["u1".into(), "u2".into()]);
        state.channels.summary_channel_id = Some("c2".into());
        state
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("attendance.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_roundtrip_preserves_order_and_bindings() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("attendance.json"));
        let state = sample_state();

        store.save(&state).unwrap();
        let loaded = store.load().unwrap().unwrap();

        assert_eq!(loaded, state);
        assert_eq!(
            serde_json::to_string(&loaded).unwrap(),
            serde_json::to_string(&state).unwrap()
        );
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attendance.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
    }

    #[test]
    fn memory_store_can_refuse_writes() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        assert!(store.save(&sample_state()).is_err());
        assert!(store.snapshot().is_none());

        store.set_fail_writes(false);
        store.save(&sample_state()).unwrap();
        assert_eq!(store.writes(), 1);
    }
}
