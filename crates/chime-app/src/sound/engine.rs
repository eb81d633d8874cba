use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

use chime_core::models::BeepPattern;

use super::device::{AudioDevice, AudioOutput, DeviceError, Voice};
use crate::event_manager::EventManager;
use crate::events::SoundEvent;

#[derive(Debug, thiserror::Error)]
pub enum SoundError {
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
}

pub type Result<T> = std::result::Result<T, SoundError>;

/// Sounds the alarm as a train of short beeps.
///
/// Idle until [`AlarmSound::start`], then one beep immediately and one every
/// pattern period until [`AlarmSound::stop`]. Each beep is its own voice that
/// silences itself after the pattern duration, so stopping only has to cancel
/// the periodic task.
pub struct AlarmSound {
    output: Arc<AudioOutput>,
    pattern: BeepPattern,
    beep_task: Mutex<Option<JoinHandle<()>>>,
    playing_tx: watch::Sender<bool>,
    event_manager: Arc<EventManager>,
}

impl AlarmSound {
    pub fn new(
        output: Arc<AudioOutput>,
        pattern: BeepPattern,
        event_manager: Arc<EventManager>,
    ) -> chime_core::Result<Self> {
        pattern.validate()?;
        let (playing_tx, _) = watch::channel(false);

        Ok(Self {
            output,
            pattern,
            beep_task: Mutex::new(None),
            playing_tx,
            event_manager,
        })
    }

    pub fn pattern(&self) -> &BeepPattern {
        &self.pattern
    }

    pub fn is_playing(&self) -> bool {
        *self.playing_tx.borrow()
    }

    /// Watch the playing flag.
    pub fn subscribe_playing(&self) -> watch::Receiver<bool> {
        self.playing_tx.subscribe()
    }

    /// Start sounding. Does nothing if already sounding.
    ///
    /// Opens the audio device on first use; a device that cannot be opened
    /// is reported here and leaves the controller idle.
    pub async fn start(&self) -> Result<()> {
        let mut beep_task = self.beep_task.lock().await;

        if beep_task.is_some() {
            tracing::debug!("Alarm sound already playing");
            return Ok(());
        }

        let device = self.output.device().await?;
        let started_at = Instant::now();

        emit_beep(&device, &self.pattern)?;
        self.playing_tx.send_replace(true);

        let handle = tokio::spawn(beep_loop(device, self.pattern, started_at));
        *beep_task = Some(handle);
        drop(beep_task);

        tracing::info!("Alarm sound started");
        self.event_manager.emit_sound(SoundEvent::started());

        Ok(())
    }

    /// Stop sounding. Beeps already in flight run out on their own.
    pub async fn stop(&self) {
        let mut beep_task = self.beep_task.lock().await;
        self.playing_tx.send_replace(false);

        let Some(handle) = beep_task.take() else {
            return;
        };
        handle.abort();
        drop(beep_task);

        tracing::info!("Alarm sound stopped");
        self.event_manager.emit_sound(SoundEvent::stopped());
    }
}

impl Drop for AlarmSound {
    fn drop(&mut self) {
        if let Some(handle) = self.beep_task.get_mut().take() {
            handle.abort();
        }
    }
}

async fn beep_loop(device: Arc<dyn AudioDevice>, pattern: BeepPattern, started_at: Instant) {
    let period = pattern.period();
    let mut ticker = interval_at(started_at + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if let Err(e) = emit_beep(&device, &pattern) {
            tracing::error!("Failed to emit beep: {}", e);
        }
    }
}

/// Start one fresh voice and hand its shutdown to a task of its own.
fn emit_beep(device: &Arc<dyn AudioDevice>, pattern: &BeepPattern) -> Result<()> {
    let voice = Voice::from_pattern(pattern);
    let id = device.start_voice(&voice)?;

    let device = device.clone();
    let duration = pattern.duration();
    tokio::spawn(async move {
        sleep(duration).await;
        if let Err(e) = device.stop_voice(id) {
            tracing::warn!("Failed to stop voice {}: {}", id, e);
        }
    });

    Ok(())
}
