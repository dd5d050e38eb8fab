use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{PlanError, Result, StoreError};
use crate::plan::Plan;

/// Key under which the plan is kept in the backing store.
pub const STORAGE_KEY: &str = "medicationPlanData";

/// Durable string-to-string storage, modelled on browser local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Stores each key as `<dir>/<key>.json`.
///
/// Values are written to a uniquely named temporary file in the same directory
/// and renamed into place, so a failed write never leaves a truncated value
/// behind and several processes may save into one directory at once.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(value.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|err| err.error)?;
        debug!(path = %path.display(), bytes = value.len(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-process store with an optional quota on the total stored bytes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota: Some(quota),
        }
    }

    /// Writes a raw value, bypassing any validation. Useful to seed corrupt data.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write();
        if let Some(quota) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(existing, _)| existing.as_str() != key)
                .map(|(existing, stored)| existing.len() + stored.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Single-slot persistence of the one [`Plan`].
pub struct PlanStore {
    backend: Box<dyn KeyValueStore>,
}

impl PlanStore {
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn save(&self, plan: &Plan) -> Result<()> {
        let json = serde_json::to_string(plan)
            .map_err(|err| PlanError::StorageWriteFailure(err.into()))?;
        self.backend
            .set(STORAGE_KEY, &json)
            .map_err(PlanError::StorageWriteFailure)?;
        info!(start = %plan.start_date, "plan saved");
        Ok(())
    }

    /// The persisted plan, or `None` when it is missing or unreadable.
    pub fn load(&self) -> Option<Plan> {
        match self.try_load() {
            Ok(plan) => plan,
            Err(err) => {
                warn!(%err, "ignoring persisted plan");
                None
            }
        }
    }

    /// Like [`load`](Self::load) but reports why a stored value was rejected.
    pub fn try_load(&self) -> Result<Option<Plan>> {
        let raw = self
            .backend
            .get(STORAGE_KEY)
            .map_err(|err| PlanError::StorageReadCorrupt(err.to_string()))?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| PlanError::StorageReadCorrupt(err.to_string()))
    }

    /// Raw stored JSON, exactly as persisted.
    pub fn load_raw(&self) -> Option<String> {
        self.backend.get(STORAGE_KEY).ok().flatten()
    }

    pub fn clear(&self) -> Result<()> {
        self.backend
            .remove(STORAGE_KEY)
            .map_err(PlanError::StorageWriteFailure)?;
        info!("plan cleared");
        Ok(())
    }
}
