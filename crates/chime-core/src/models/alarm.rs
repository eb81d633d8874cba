//! Alarm data model

use super::TimeFormat;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LABEL: &str = "Alarm";
pub const DEFAULT_SOUND: &str = "default";

/// One user-configured wake-up time.
///
/// `hour` and `minute` are stored exactly as supplied. Nothing at this layer
/// checks that they form a valid time of day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlarmRecord {
    pub id: i64,
    pub hour: i64,
    pub minute: i64,
    #[serde(default = "default_label")]
    pub label: String,
    #[serde(default = "default_sound")]
    pub sound: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// Caller input for a new alarm. The id and enabled flag are never supplied here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAlarm {
    pub hour: i64,
    pub minute: i64,
    pub label: Option<String>,
    pub sound: Option<String>,
}

fn default_label() -> String {
    DEFAULT_LABEL.to_string()
}

fn default_sound() -> String {
    DEFAULT_SOUND.to_string()
}

fn default_enabled() -> bool {
    true
}

/// Empty strings count as absent.
fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => fallback.to_string(),
    }
}

impl NewAlarm {
    pub fn new(hour: i64, minute: i64) -> Self {
        Self {
            hour,
            minute,
            label: None,
            sound: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = Some(sound.into());
        self
    }
}

impl AlarmRecord {
    /// Build an enabled record from caller input, filling in label and sound defaults.
    pub fn create(id: i64, input: NewAlarm) -> Self {
        Self {
            id,
            hour: input.hour,
            minute: input.minute,
            label: non_empty_or(input.label, DEFAULT_LABEL),
            sound: non_empty_or(input.sound, DEFAULT_SOUND),
            enabled: true,
        }
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    /// Render the alarm time in the given clock format, e.g. `07:30` or `7:30 AM`.
    pub fn format_time(&self, format: TimeFormat) -> String {
        match format {
            TimeFormat::H24 => format!("{:02}:{:02}", self.hour, self.minute),
            TimeFormat::H12 => {
                let suffix = if self.hour.rem_euclid(24) < 12 { "AM" } else { "PM" };
                let hour = match self.hour.rem_euclid(12) {
                    0 => 12,
                    h => h,
                };
                format!("{}:{:02} {}", hour, self.minute, suffix)
            }
        }
    }
}
