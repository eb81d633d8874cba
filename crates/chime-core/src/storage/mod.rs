pub mod alarm;
pub mod backend;
pub mod settings;

pub use alarm::AlarmStorage;
pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use settings::SettingsStorage;

use crate::Error;
use std::path::PathBuf;

/// Slot holding the JSON array of alarms
pub const ALARMS_SLOT: &str = "clock-alarms";

/// Slot holding the JSON settings object
pub const SETTINGS_SLOT: &str = "clock-settings";

pub fn get_data_dir() -> crate::Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("chime"))
        .ok_or_else(|| Error::Storage("Could not find data directory".to_string()))
}

pub fn init_data_dir() -> crate::Result<PathBuf> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    Ok(data_dir)
}
