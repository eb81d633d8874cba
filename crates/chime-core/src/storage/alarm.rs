//! Alarm list storage

use super::{KeyValueStore, ALARMS_SLOT};
use crate::{models::AlarmRecord, Result};
use std::sync::Arc;

pub struct AlarmStorage {
    store: Arc<dyn KeyValueStore>,
}

impl AlarmStorage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read the persisted alarms, reporting malformed data as an error.
    pub fn try_load(&self) -> Result<Vec<AlarmRecord>> {
        let Some(content) = self.store.get(ALARMS_SLOT)? else {
            return Ok(Vec::new());
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let alarms: Vec<AlarmRecord> = serde_json::from_str(&content)?;
        Ok(alarms)
    }

    /// Read the persisted alarms. Anything unreadable counts as no alarms.
    pub fn load(&self) -> Vec<AlarmRecord> {
        self.try_load().unwrap_or_default()
    }

    pub fn save(&self, alarms: &[AlarmRecord]) -> Result<()> {
        let content = serde_json::to_string(alarms)?;
        self.store.set(ALARMS_SLOT, &content)
    }
}
