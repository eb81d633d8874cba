//! Alarm manager - the in-memory alarm list with write-through persistence

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::event_manager::EventManager;
use crate::events::AlarmEvent;
use chime_core::{
    models::{AlarmRecord, NewAlarm},
    storage::AlarmStorage,
    Clock,
};

#[derive(Debug, thiserror::Error)]
pub enum AlarmManagerError {
    #[error("Core error: {0}")]
    Core(#[from] chime_core::Error),
}

pub type Result<T> = std::result::Result<T, AlarmManagerError>;

/// Owns the alarm list.
///
/// Every mutation builds the new list, writes it to storage, and only then
/// replaces the in-memory list. A failed write leaves the list untouched and
/// is returned to the caller.
pub struct AlarmManager {
    storage: AlarmStorage,
    clock: Arc<dyn Clock>,
    alarms: RwLock<Vec<AlarmRecord>>,
    event_manager: Arc<EventManager>,
}

impl AlarmManager {
    /// Create the manager, seeded from whatever the storage slot holds.
    pub fn new(
        storage: AlarmStorage,
        clock: Arc<dyn Clock>,
        event_manager: Arc<EventManager>,
    ) -> Self {
        let alarms = match storage.try_load() {
            Ok(alarms) => alarms,
            Err(e) => {
                tracing::warn!("Discarding unreadable alarm data: {}", e);
                Vec::new()
            }
        };
        tracing::debug!("Loaded {} alarms", alarms.len());

        Self {
            storage,
            clock,
            alarms: RwLock::new(alarms),
            event_manager,
        }
    }

    pub async fn list(&self) -> Vec<AlarmRecord> {
        self.alarms.read().await.clone()
    }

    pub async fn get(&self, id: i64) -> Option<AlarmRecord> {
        let alarms = self.alarms.read().await;
        alarms.iter().find(|a| a.id == id).cloned()
    }

    /// Append a new enabled alarm, stamped with the current time as its id.
    pub async fn add(&self, input: NewAlarm) -> Result<AlarmRecord> {
        let mut alarms = self.alarms.write().await;

        let id = self.next_id(&alarms)?;
        let alarm = AlarmRecord::create(id, input);
        let mut updated = alarms.clone();
        updated.push(alarm.clone());

        self.storage.save(&updated)?;
        *alarms = updated;
        drop(alarms);

        tracing::info!(
            "Added alarm {} at {:02}:{:02}",
            alarm.id,
            alarm.hour,
            alarm.minute
        );
        self.event_manager.emit_alarm(AlarmEvent::added(alarm.clone()));

        Ok(alarm)
    }

    /// Remove the alarm with this id. Returns `false` without touching storage
    /// when there is no such alarm.
    pub async fn remove(&self, id: i64) -> Result<bool> {
        let mut alarms = self.alarms.write().await;

        let Some(index) = alarms.iter().position(|a| a.id == id) else {
            return Ok(false);
        };

        let mut updated = alarms.clone();
        updated.remove(index);

        self.storage.save(&updated)?;
        *alarms = updated;
        drop(alarms);

        tracing::info!("Removed alarm {}", id);
        self.event_manager.emit_alarm(AlarmEvent::removed(id));

        Ok(true)
    }

    /// Flip the enabled flag. Returns `None` without touching storage when
    /// there is no such alarm.
    pub async fn toggle(&self, id: i64) -> Result<Option<AlarmRecord>> {
        let mut alarms = self.alarms.write().await;

        let Some(index) = alarms.iter().position(|a| a.id == id) else {
            return Ok(None);
        };

        let mut updated = alarms.clone();
        updated[index].toggle();
        let alarm = updated[index].clone();

        self.storage.save(&updated)?;
        *alarms = updated;
        drop(alarms);

        tracing::info!("Alarm {} enabled={}", id, alarm.enabled);
        self.event_manager
            .emit_alarm(AlarmEvent::toggled(alarm.clone()));

        Ok(Some(alarm))
    }

    /// The current timestamp, bumped past the largest existing id when two
    /// alarms land on the same millisecond.
    fn next_id(&self, alarms: &[AlarmRecord]) -> Result<i64> {
        let now = self.clock.now_millis();
        match alarms.iter().map(|a| a.id).max() {
            Some(last) if last >= now => last.checked_add(1).ok_or_else(|| {
                chime_core::Error::Validation(format!("No alarm id left after {}", last)).into()
            }),
            _ => Ok(now),
        }
    }
}
