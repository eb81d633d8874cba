//! Audio output capability and the devices behind it

use std::io::{IsTerminal, Write};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::OnceCell;

use chime_core::models::{BeepPattern, Waveform};

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Audio device unavailable: {0}")]
    Unavailable(String),

    #[error("Unknown voice: {0}")]
    UnknownVoice(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DeviceError>;

pub type VoiceId = u64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oscillator {
    pub waveform: Waveform,
    pub frequency_hz: f32,
}

impl Oscillator {
    /// Amplitude in `[-1, 1]` at `phase`, the fraction of the current cycle.
    pub fn sample(&self, phase: f32) -> f32 {
        match self.waveform {
            Waveform::Sine => (std::f32::consts::TAU * phase).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }
}

/// Gain that starts at `start_gain` and ramps exponentially to `target_gain`
/// over `ramp_ms`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainEnvelope {
    pub start_gain: f32,
    pub target_gain: f32,
    pub ramp_ms: u64,
}

impl GainEnvelope {
    /// Gain `elapsed` into the ramp. Holds the target once the ramp is over.
    pub fn gain_at(&self, elapsed: Duration) -> f32 {
        let ramp = Duration::from_millis(self.ramp_ms);
        if ramp.is_zero() || elapsed >= ramp {
            return self.target_gain;
        }
        let progress = elapsed.as_secs_f32() / ramp.as_secs_f32();
        self.start_gain * (self.target_gain / self.start_gain).powf(progress)
    }
}

/// One oscillator routed through one envelope to the device output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub oscillator: Oscillator,
    pub envelope: GainEnvelope,
}

impl Voice {
    pub fn from_pattern(pattern: &BeepPattern) -> Self {
        Self {
            oscillator: Oscillator {
                waveform: pattern.waveform,
                frequency_hz: pattern.frequency_hz,
            },
            envelope: GainEnvelope {
                start_gain: pattern.start_gain,
                target_gain: pattern.floor_gain,
                ramp_ms: pattern.duration_ms,
            },
        }
    }
}

/// Something that can make a sound.
pub trait AudioDevice: Send + Sync {
    /// Connect the voice to the output and start it immediately.
    fn start_voice(&self, voice: &Voice) -> Result<VoiceId>;

    /// Silence a voice started earlier.
    fn stop_voice(&self, id: VoiceId) -> Result<()>;
}

pub type DeviceFactory = Box<dyn Fn() -> Result<Arc<dyn AudioDevice>> + Send + Sync>;

/// The audio output shared by everything in one context.
///
/// The device is opened by `factory` on first use and then kept for as long
/// as this handle lives.
pub struct AudioOutput {
    factory: Option<DeviceFactory>,
    device: OnceCell<Arc<dyn AudioDevice>>,
}

impl AudioOutput {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn AudioDevice>> + Send + Sync + 'static,
    {
        Self {
            factory: Some(Box::new(factory)),
            device: OnceCell::new(),
        }
    }

    /// Wrap an already opened device.
    pub fn with_device(device: Arc<dyn AudioDevice>) -> Self {
        Self {
            factory: None,
            device: OnceCell::new_with(Some(device)),
        }
    }

    pub async fn device(&self) -> Result<Arc<dyn AudioDevice>> {
        let device = self
            .device
            .get_or_try_init(|| async {
                let Some(factory) = &self.factory else {
                    return Err(DeviceError::Unavailable("no device to open".to_string()));
                };
                tracing::info!("Opening audio device");
                factory()
            })
            .await?;
        Ok(device.clone())
    }

    pub fn is_open(&self) -> bool {
        self.device.initialized()
    }
}

/// Rings the terminal bell once per voice.
pub struct BellDevice {
    next_id: AtomicU64,
}

impl BellDevice {
    pub fn open() -> Result<Self> {
        if !std::io::stdout().is_terminal() {
            return Err(DeviceError::Unavailable(
                "stdout is not a terminal".to_string(),
            ));
        }
        Ok(Self {
            next_id: AtomicU64::new(1),
        })
    }
}

impl AudioDevice for BellDevice {
    fn start_voice(&self, voice: &Voice) -> Result<VoiceId> {
        let mut stdout = std::io::stdout();
        stdout.write_all(b"\x07")?;
        stdout.flush()?;
        tracing::trace!("Bell for {} Hz voice", voice.oscillator.frequency_hz);
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn stop_voice(&self, _id: VoiceId) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    Started { id: VoiceId, voice: Voice },
    Stopped { id: VoiceId },
}

/// Keeps a log of voice starts and stops instead of producing sound.
#[derive(Default)]
pub struct RecordingDevice {
    next_id: AtomicU64,
    log: Mutex<Vec<DeviceEvent>>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DeviceEvent> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn started_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, DeviceEvent::Started { .. }))
            .count()
    }

    pub fn stopped_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, DeviceEvent::Stopped { .. }))
            .count()
    }

    /// Voices started but not yet stopped
    pub fn active_count(&self) -> usize {
        self.started_count().saturating_sub(self.stopped_count())
    }

    fn record(&self, event: DeviceEvent) -> Result<()> {
        let mut log = self
            .log
            .lock()
            .map_err(|_| DeviceError::Unavailable("recording log poisoned".to_string()))?;
        log.push(event);
        Ok(())
    }
}

impl AudioDevice for RecordingDevice {
    fn start_voice(&self, voice: &Voice) -> Result<VoiceId> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.record(DeviceEvent::Started { id, voice: *voice })?;
        Ok(id)
    }

    /// Fails for ids that were never started or are already stopped.
    fn stop_voice(&self, id: VoiceId) -> Result<()> {
        let events = self.events();
        let started = events
            .iter()
            .any(|e| matches!(e, DeviceEvent::Started { id: started, .. } if *started == id));
        let stopped = events
            .iter()
            .any(|e| matches!(e, DeviceEvent::Stopped { id: stopped } if *stopped == id));
        if !started || stopped {
            return Err(DeviceError::UnknownVoice(id));
        }
        self.record(DeviceEvent::Stopped { id })
    }
}
