//! Settings manager

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::event_manager::EventManager;
use crate::events::SettingsEvent;
use chime_core::{
    models::{SettingsRecord, Theme, ThemeMode, TimeFormat},
    storage::SettingsStorage,
    Clock,
};

#[derive(Debug, thiserror::Error)]
pub enum SettingsManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] chime_core::Error),
}

pub type Result<T> = std::result::Result<T, SettingsManagerError>;

/// Manages the display settings
pub struct SettingsManager {
    storage: SettingsStorage,
    clock: Arc<dyn Clock>,
    settings: RwLock<SettingsRecord>,
    event_manager: Arc<EventManager>,
}

impl SettingsManager {
    pub fn new(
        storage: SettingsStorage,
        clock: Arc<dyn Clock>,
        event_manager: Arc<EventManager>,
    ) -> Self {
        let settings = match storage.try_load() {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Using default settings, stored settings unreadable: {}", e);
                SettingsRecord::default()
            }
        };

        Self {
            storage,
            clock,
            settings: RwLock::new(settings),
            event_manager,
        }
    }

    pub async fn get(&self) -> SettingsRecord {
        self.settings.read().await.clone()
    }

    /// Apply a batch of field changes and persist the result once.
    ///
    /// Nothing is written when the batch leaves the settings unchanged.
    pub async fn update<F>(&self, apply: F) -> Result<SettingsRecord>
    where
        F: FnOnce(&mut SettingsRecord),
    {
        let mut current = self.settings.write().await;

        let mut updated = current.clone();
        apply(&mut updated);

        if updated == *current {
            return Ok(updated);
        }

        self.storage.save(&updated)?;
        *current = updated.clone();
        drop(current);

        tracing::debug!("Settings saved");
        self.event_manager
            .emit_settings(SettingsEvent::changed(updated.clone()));

        Ok(updated)
    }

    pub async fn set_time_format(&self, time_format: TimeFormat) -> Result<SettingsRecord> {
        self.update(|s| s.time_format = time_format).await
    }

    pub async fn set_show_seconds(&self, show_seconds: bool) -> Result<SettingsRecord> {
        self.update(|s| s.show_seconds = show_seconds).await
    }

    pub async fn set_show_date(&self, show_date: bool) -> Result<SettingsRecord> {
        self.update(|s| s.show_date = show_date).await
    }

    pub async fn set_theme_mode(&self, theme_mode: ThemeMode) -> Result<SettingsRecord> {
        self.update(|s| s.theme_mode = theme_mode).await
    }

    pub async fn set_clock_color(&self, clock_color: String) -> Result<SettingsRecord> {
        self.update(|s| s.clock_color = clock_color).await
    }

    pub async fn set_font_size(&self, font_size: i64) -> Result<SettingsRecord> {
        self.update(|s| s.font_size = font_size).await
    }

    pub async fn set_font_weight(&self, font_weight: i64) -> Result<SettingsRecord> {
        self.update(|s| s.font_weight = font_weight).await
    }

    /// Restore every known field to its default. Unknown stored keys are kept.
    pub async fn reset(&self) -> Result<SettingsRecord> {
        self.update(|s| {
            let extra = std::mem::take(&mut s.extra);
            *s = SettingsRecord {
                extra,
                ..SettingsRecord::default()
            };
        })
        .await
    }

    /// The theme to render with right now. `auto` follows the local hour.
    pub async fn current_theme(&self) -> Theme {
        let theme_mode = self.settings.read().await.theme_mode;
        theme_mode.resolve(self.clock.local_hour())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ChimeEvent;
    use chime_core::ManualClock;
    use chime_core::storage::{KeyValueStore, MemoryStore, SETTINGS_SLOT};
    use serde_json::{json, Value};

    fn create_manager(store: Arc<MemoryStore>, clock: Arc<ManualClock>) -> SettingsManager {
        SettingsManager::new(
            SettingsStorage::new(store),
            clock,
            Arc::new(EventManager::new()),
        )
    }

    fn persisted(store: &MemoryStore) -> Value {
        let content = store.get(SETTINGS_SLOT).unwrap().unwrap();
        serde_json::from_str(&content).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_without_storage() {
        let manager = create_manager(Arc::new(MemoryStore::new()), Arc::new(ManualClock::new(0, 12)));
        assert_eq!(manager.get().await, SettingsRecord::default());
    }

    #[tokio::test]
    async fn test_partial_stored_settings() {
        let store = Arc::new(MemoryStore::new());
        store.set(SETTINGS_SLOT, r#"{"fontSize":150}"#).unwrap();

        let manager = create_manager(store, Arc::new(ManualClock::new(0, 12)));
        let settings = manager.get().await;
        assert_eq!(settings.font_size, 150);
        assert_eq!(
            settings,
            SettingsRecord {
                font_size: 150,
                ..SettingsRecord::default()
            }
        );
    }

    #[tokio::test]
    async fn test_setter_persists_whole_object() {
        let store = Arc::new(MemoryStore::new());
        let manager = create_manager(store.clone(), Arc::new(ManualClock::new(0, 12)));

        manager.set_show_seconds(false).await.unwrap();

        assert_eq!(
            persisted(&store),
            json!({
                "timeFormat": 24,
                "showSeconds": false,
                "showDate": true,
                "themeMode": "auto",
                "clockColor": "#f39c12",
                "fontSize": 100,
                "fontWeight": 100
            })
        );
    }

    #[tokio::test]
    async fn test_batch_update_final_state_is_durable() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(0, 12));
        let manager = create_manager(store.clone(), clock.clone());

        manager
            .update(|s| {
                s.time_format = TimeFormat::H12;
                s.clock_color = "#112233".to_string();
                s.font_weight = 700;
            })
            .await
            .unwrap();
        manager.set_font_size(80).await.unwrap();
        manager.set_theme_mode(ThemeMode::Light).await.unwrap();

        let reloaded = create_manager(store, clock);
        assert_eq!(reloaded.get().await, manager.get().await);
        assert_eq!(reloaded.get().await.font_size, 80);
    }

    #[tokio::test]
    async fn test_unchanged_update_does_not_write() {
        let store = Arc::new(MemoryStore::new());
        let manager = create_manager(store.clone(), Arc::new(ManualClock::new(0, 12)));

        manager.set_show_date(true).await.unwrap();
        assert_eq!(store.get(SETTINGS_SLOT).unwrap(), None);
    }

    #[tokio::test]
    async fn test_reset_keeps_unknown_keys() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(SETTINGS_SLOT, r#"{"fontSize":150,"language":"en"}"#)
            .unwrap();
        let manager = create_manager(store.clone(), Arc::new(ManualClock::new(0, 12)));

        let settings = manager.reset().await.unwrap();
        assert_eq!(settings.font_size, 100);
        assert_eq!(persisted(&store)["language"], json!("en"));
    }

    #[tokio::test]
    async fn test_current_theme_auto() {
        let clock = Arc::new(ManualClock::new(0, 10));
        let manager = create_manager(Arc::new(MemoryStore::new()), clock.clone());

        assert_eq!(manager.current_theme().await, Theme::Light);
        clock.set_hour(20);
        assert_eq!(manager.current_theme().await, Theme::Dark);
        clock.set_hour(6);
        assert_eq!(manager.current_theme().await, Theme::Light);
        clock.set_hour(18);
        assert_eq!(manager.current_theme().await, Theme::Dark);
    }

    #[tokio::test]
    async fn test_current_theme_fixed() {
        let clock = Arc::new(ManualClock::new(0, 10));
        let manager = create_manager(Arc::new(MemoryStore::new()), clock);

        manager.set_theme_mode(ThemeMode::Dark).await.unwrap();
        assert_eq!(manager.current_theme().await, Theme::Dark);
    }

    #[tokio::test]
    async fn test_change_emits_event() {
        let event_manager = Arc::new(EventManager::new());
        let mut events = event_manager.subscribe();
        let manager = SettingsManager::new(
            SettingsStorage::new(Arc::new(MemoryStore::new())),
            Arc::new(ManualClock::new(0, 12)),
            event_manager,
        );

        manager.set_font_weight(300).await.unwrap();

        match events.recv().await.unwrap() {
            ChimeEvent::Settings(event) => assert_eq!(event.settings.font_weight, 300),
            other => panic!("Expected settings event, got {:?}", other),
        }
    }
}
