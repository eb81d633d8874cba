//! Display settings

use crate::Error;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Hours in `[LIGHT_START_HOUR, LIGHT_END_HOUR)` resolve to the light theme in auto mode.
pub const LIGHT_START_HOUR: u32 = 6;
pub const LIGHT_END_HOUR: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TimeFormat {
    H12,
    H24,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Auto,
    Light,
    Dark,
}

/// A concrete theme, after `auto` has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    pub time_format: TimeFormat,
    pub show_seconds: bool,
    pub show_date: bool,
    pub theme_mode: ThemeMode,
    pub clock_color: String,
    /// Percentage of the base font size
    pub font_size: i64,
    pub font_weight: i64,
    /// Keys found in storage that this version does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TryFrom<u8> for TimeFormat {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            12 => Ok(Self::H12),
            24 => Ok(Self::H24),
            other => Err(Error::Validation(format!(
                "Invalid time format '{}'. Must be 12 or 24",
                other
            ))),
        }
    }
}

impl From<TimeFormat> for u8 {
    fn from(format: TimeFormat) -> Self {
        match format {
            TimeFormat::H12 => 12,
            TimeFormat::H24 => 24,
        }
    }
}

impl FromStr for TimeFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|_| Error::Validation(format!("Invalid time format '{}'", s)))?;
        Self::try_from(value)
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

impl ThemeMode {
    /// Resolve to a concrete theme. Only `Auto` looks at the hour.
    pub fn resolve(self, local_hour: u32) -> Theme {
        match self {
            Self::Light => Theme::Light,
            Self::Dark => Theme::Dark,
            Self::Auto => {
                if (LIGHT_START_HOUR..LIGHT_END_HOUR).contains(&local_hour) {
                    Theme::Light
                } else {
                    Theme::Dark
                }
            }
        }
    }
}

impl FromStr for ThemeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(Error::Validation(format!(
                "Invalid theme mode '{}'. Must be one of: auto, light, dark",
                s
            ))),
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Light => "light",
            Self::Dark => "dark",
        };
        f.write_str(name)
    }
}

impl SettingsRecord {
    /// Merge a stored object over the defaults.
    ///
    /// Stored values win field by field. A missing field, or one whose stored
    /// value has the wrong shape, keeps its default. Unrecognized keys are
    /// carried along in `extra`.
    pub fn merged_over_defaults(mut stored: Map<String, Value>) -> Self {
        let defaults = Self::default();

        let time_format = take_field(&mut stored, "timeFormat", defaults.time_format);
        let show_seconds = take_field(&mut stored, "showSeconds", defaults.show_seconds);
        let show_date = take_field(&mut stored, "showDate", defaults.show_date);
        let theme_mode = take_field(&mut stored, "themeMode", defaults.theme_mode);
        let clock_color = take_field(&mut stored, "clockColor", defaults.clock_color);
        let font_size = take_field(&mut stored, "fontSize", defaults.font_size);
        let font_weight = take_field(&mut stored, "fontWeight", defaults.font_weight);

        Self {
            time_format,
            show_seconds,
            show_date,
            theme_mode,
            clock_color,
            font_size,
            font_weight,
            extra: stored,
        }
    }

    pub fn current_theme(&self, local_hour: u32) -> Theme {
        self.theme_mode.resolve(local_hour)
    }
}

fn take_field<T: DeserializeOwned>(map: &mut Map<String, Value>, key: &str, fallback: T) -> T {
    match map.remove(key) {
        Some(value) => serde_json::from_value(value).unwrap_or(fallback),
        None => fallback,
    }
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::H24,
            show_seconds: true,
            show_date: true,
            theme_mode: ThemeMode::Auto,
            clock_color: "#f39c12".to_string(),
            font_size: 100,
            font_weight: 100,
            extra: Map::new(),
        }
    }
}
