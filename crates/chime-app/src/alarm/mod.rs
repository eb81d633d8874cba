pub mod manager;

pub use manager::{AlarmManager, AlarmManagerError};
