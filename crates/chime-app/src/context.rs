//! Wiring for one running clock.
//!
//! A `ClockContext` owns the alarm list, the settings and the alarm sound.
//! Build exactly one per process and hand clones of its `Arc`s to whatever
//! needs them.

use std::sync::Arc;

use chime_core::{
    models::BeepPattern,
    storage::{AlarmStorage, KeyValueStore, MemoryStore, SettingsStorage},
    Clock,
};

use crate::alarm::AlarmManager;
use crate::event_manager::EventManager;
use crate::settings::SettingsManager;
use crate::sound::{AlarmSound, AudioDevice, AudioOutput};

pub struct ClockContext {
    pub events: Arc<EventManager>,
    pub alarms: Arc<AlarmManager>,
    pub settings: Arc<SettingsManager>,
    pub sound: Arc<AlarmSound>,
}

impl ClockContext {
    /// Load alarms and settings from `store` and prepare the sound on `output`.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        output: AudioOutput,
        pattern: BeepPattern,
    ) -> chime_core::Result<Self> {
        let events = Arc::new(EventManager::new());

        let alarms = Arc::new(AlarmManager::new(
            AlarmStorage::new(store.clone()),
            clock.clone(),
            events.clone(),
        ));
        let settings = Arc::new(SettingsManager::new(
            SettingsStorage::new(store),
            clock,
            events.clone(),
        ));
        let sound = Arc::new(AlarmSound::new(
            Arc::new(output),
            pattern,
            events.clone(),
        )?);

        Ok(Self {
            events,
            alarms,
            settings,
            sound,
        })
    }

    /// A context with nothing persisted outside the process.
    pub fn in_memory(
        clock: Arc<dyn Clock>,
        device: Arc<dyn AudioDevice>,
    ) -> chime_core::Result<Self> {
        Self::new(
            Arc::new(MemoryStore::new()),
            clock,
            AudioOutput::with_device(device),
            BeepPattern::default(),
        )
    }
}
