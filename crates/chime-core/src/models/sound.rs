//! Alarm tone parameters

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MIN_FREQUENCY_HZ: f32 = 20.0;
const MAX_FREQUENCY_HZ: f32 = 20_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// Shape of the repeating alarm beep.
///
/// Every `period_ms` a fresh voice is started at `frequency_hz`. Its gain
/// starts at `start_gain` and decays exponentially towards `floor_gain` over
/// `duration_ms`, after which the voice is stopped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeepPattern {
    pub waveform: Waveform,
    pub frequency_hz: f32,
    pub period_ms: u64,
    pub duration_ms: u64,
    pub start_gain: f32,
    pub floor_gain: f32,
}

impl BeepPattern {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_FREQUENCY_HZ..=MAX_FREQUENCY_HZ).contains(&self.frequency_hz) {
            return Err(Error::Validation(format!(
                "Frequency must be between {} and {} Hz",
                MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ
            )));
        }

        if self.period_ms == 0 {
            return Err(Error::Validation(
                "Beep period must be greater than 0".to_string(),
            ));
        }

        if self.duration_ms == 0 {
            return Err(Error::Validation(
                "Beep duration must be greater than 0".to_string(),
            ));
        }

        // An exponential ramp can never reach zero.
        if self.floor_gain <= 0.0 || self.start_gain <= 0.0 {
            return Err(Error::Validation(
                "Gain values must be greater than 0".to_string(),
            ));
        }

        if self.floor_gain >= self.start_gain {
            return Err(Error::Validation(
                "Floor gain must be lower than start gain".to_string(),
            ));
        }

        Ok(())
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl Default for BeepPattern {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            frequency_hz: 800.0,
            period_ms: 500,
            duration_ms: 200,
            start_gain: 0.3,
            floor_gain: 0.01,
        }
    }
}
