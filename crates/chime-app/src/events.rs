//! Events emitted after state changes

use chime_core::models::{AlarmRecord, SettingsRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum ChimeEvent {
    Alarm(AlarmEvent),
    Settings(SettingsEvent),
    Sound(SoundEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmEvent {
    pub event_type: AlarmEventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm: Option<AlarmRecord>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlarmEventType {
    Added,
    Removed { alarm_id: i64 },
    Toggled { enabled: bool },
}

impl AlarmEvent {
    pub fn added(alarm: AlarmRecord) -> Self {
        Self {
            event_type: AlarmEventType::Added,
            alarm: Some(alarm),
            timestamp: Utc::now(),
        }
    }

    pub fn removed(alarm_id: i64) -> Self {
        Self {
            event_type: AlarmEventType::Removed { alarm_id },
            alarm: None,
            timestamp: Utc::now(),
        }
    }

    pub fn toggled(alarm: AlarmRecord) -> Self {
        Self {
            event_type: AlarmEventType::Toggled {
                enabled: alarm.enabled,
            },
            alarm: Some(alarm),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsEvent {
    pub settings: SettingsRecord,
    pub timestamp: DateTime<Utc>,
}

impl SettingsEvent {
    pub fn changed(settings: SettingsRecord) -> Self {
        Self {
            settings,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundEvent {
    pub event_type: SoundEventType,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SoundEventType {
    Started,
    Stopped,
}

impl SoundEvent {
    pub fn started() -> Self {
        Self {
            event_type: SoundEventType::Started,
            timestamp: Utc::now(),
        }
    }

    pub fn stopped() -> Self {
        Self {
            event_type: SoundEventType::Stopped,
            timestamp: Utc::now(),
        }
    }
}
