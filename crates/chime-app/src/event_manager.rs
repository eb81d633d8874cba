//! Central event broadcasting

use tokio::sync::broadcast;

use crate::events::{AlarmEvent, ChimeEvent, SettingsEvent, SoundEvent};

/// Fans state-change events out to any number of subscribers
pub struct EventManager {
    event_tx: broadcast::Sender<ChimeEvent>,
}

impl EventManager {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self { event_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChimeEvent> {
        self.event_tx.subscribe()
    }

    pub fn emit_alarm(&self, event: AlarmEvent) {
        tracing::debug!("EventManager: alarm event {:?}", event.event_type);
        let _ = self.event_tx.send(ChimeEvent::Alarm(event));
    }

    pub fn emit_settings(&self, event: SettingsEvent) {
        let _ = self.event_tx.send(ChimeEvent::Settings(event));
    }

    pub fn emit_sound(&self, event: SoundEvent) {
        tracing::debug!("EventManager: sound event {:?}", event.event_type);
        let _ = self.event_tx.send(ChimeEvent::Sound(event));
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}
