#[cfg(feature = "cpal")]
pub mod cpal_output;
pub mod device;
pub mod engine;
pub mod mixer;

#[cfg(test)]
mod tests;

#[cfg(feature = "cpal")]
pub use cpal_output::CpalDevice;
pub use device::{
    AudioDevice, AudioOutput, BellDevice, DeviceError, GainEnvelope, Oscillator, RecordingDevice,
    Voice, VoiceId,
};
pub use engine::{AlarmSound, SoundError};
pub use mixer::Mixer;
