//! Settings storage

use super::{KeyValueStore, SETTINGS_SLOT};
use crate::{models::SettingsRecord, Error, Result};
use serde_json::Value;
use std::sync::Arc;

pub struct SettingsStorage {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsStorage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read the persisted settings merged over the defaults.
    pub fn try_load(&self) -> Result<SettingsRecord> {
        let Some(content) = self.store.get(SETTINGS_SLOT)? else {
            return Ok(SettingsRecord::default());
        };

        // Handle empty slot case
        if content.trim().is_empty() {
            return Ok(SettingsRecord::default());
        }

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(stored) => Ok(SettingsRecord::merged_over_defaults(stored)),
            other => Err(Error::Validation(format!(
                "Expected a settings object, found {}",
                other
            ))),
        }
    }

    /// Read the persisted settings, falling back to pure defaults.
    pub fn load(&self) -> SettingsRecord {
        self.try_load().unwrap_or_default()
    }

    pub fn save(&self, settings: &SettingsRecord) -> Result<()> {
        let content = serde_json::to_string(settings)?;
        self.store.set(SETTINGS_SLOT, &content)
    }
}
