//! Sound card output through cpal

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::device::{AudioDevice, DeviceError, Result, Voice, VoiceId};
use super::mixer::Mixer;

/// Plays voices on the default output device.
///
/// The stream lives on a thread of its own, since cpal streams cannot move
/// between threads on every host. Dropping the device closes the stream.
pub struct CpalDevice {
    mixer: Arc<Mutex<Mixer>>,
    next_id: AtomicU64,
    _shutdown: mpsc::Sender<()>,
}

impl CpalDevice {
    pub fn open() -> Result<Self> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        thread::Builder::new()
            .name("chime-audio".to_string())
            .spawn(move || match open_stream() {
                Ok((stream, mixer)) => {
                    let _ = ready_tx.send(Ok(mixer));
                    // Blocks until the device handle is dropped
                    let _ = shutdown_rx.recv();
                    drop(stream);
                    tracing::debug!("Audio stream closed");
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })?;

        let mixer = ready_rx
            .recv()
            .map_err(|_| DeviceError::Unavailable("audio thread exited".to_string()))??;

        Ok(Self {
            mixer,
            next_id: AtomicU64::new(1),
            _shutdown: shutdown_tx,
        })
    }

    fn mixer(&self) -> Result<std::sync::MutexGuard<'_, Mixer>> {
        self.mixer
            .lock()
            .map_err(|_| DeviceError::Unavailable("mixer poisoned".to_string()))
    }
}

impl AudioDevice for CpalDevice {
    fn start_voice(&self, voice: &Voice) -> Result<VoiceId> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.mixer()?.add(id, *voice);
        Ok(id)
    }

    fn stop_voice(&self, id: VoiceId) -> Result<()> {
        if self.mixer()?.remove(id) {
            Ok(())
        } else {
            Err(DeviceError::UnknownVoice(id))
        }
    }
}

fn open_stream() -> Result<(cpal::Stream, Arc<Mutex<Mixer>>)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| DeviceError::Unavailable("no output device".to_string()))?;

    let supported = device
        .default_output_config()
        .map_err(|e| DeviceError::Unavailable(e.to_string()))?;
    if supported.sample_format() != cpal::SampleFormat::F32 {
        return Err(DeviceError::Unavailable(format!(
            "unsupported sample format {:?}",
            supported.sample_format()
        )));
    }

    let config: cpal::StreamConfig = supported.into();
    let channels = config.channels as usize;
    let mixer = Arc::new(Mutex::new(Mixer::new(config.sample_rate.0)));

    let render_mixer = mixer.clone();
    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| match render_mixer.lock() {
                Ok(mut mixer) => mixer.render(data, channels),
                Err(_) => data.fill(0.0),
            },
            |e| tracing::error!("Audio stream error: {}", e),
            None,
        )
        .map_err(|e| DeviceError::Unavailable(e.to_string()))?;
    stream
        .play()
        .map_err(|e| DeviceError::Unavailable(e.to_string()))?;

    tracing::info!(
        "Audio stream open: {} Hz, {} channels",
        config.sample_rate.0,
        channels
    );
    Ok((stream, mixer))
}
