pub mod alarm;
pub mod settings;
pub mod sound;

pub use alarm::{AlarmRecord, NewAlarm};
pub use settings::{SettingsRecord, Theme, ThemeMode, TimeFormat};
pub use sound::{BeepPattern, Waveform};
