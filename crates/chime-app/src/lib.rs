//! Chime application library
//!
//! Alarm list, display settings and alarm sound, composed by the `chime` CLI.

pub mod alarm;
pub mod context;
pub mod event_manager;
pub mod events;
pub mod settings;
pub mod sound;

pub use alarm::AlarmManager;
pub use context::ClockContext;
pub use event_manager::EventManager;
pub use events::ChimeEvent;
pub use settings::SettingsManager;
pub use sound::{AlarmSound, AudioOutput};
