//! Key-value slot backends

use crate::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

/// String-valued key-value storage, one value per named slot.
pub trait KeyValueStore: Send + Sync {
    /// Read a slot. `Ok(None)` when it has never been written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite a slot wholesale.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Stores each slot as `<key>.json` inside a directory.
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);

        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::write(self.slot_path(key), value)?;
        Ok(())
    }
}

/// Process-local slots, used by tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let slots = self
            .slots
            .read()
            .map_err(|_| Error::Storage("memory store lock poisoned".to_string()))?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| Error::Storage("memory store lock poisoned".to_string()))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_missing_slot() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().to_path_buf());
        assert_eq!(store.get("clock-alarms").unwrap(), None);
    }

    #[test]
    fn test_file_store_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("nested"));

        store.set("clock-settings", "{\"a\":1}").unwrap();
        store.set("clock-settings", "{\"a\":2}").unwrap();

        assert_eq!(
            store.get("clock-settings").unwrap().as_deref(),
            Some("{\"a\":2}")
        );
        assert!(temp_dir.path().join("nested/clock-settings.json").exists());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
