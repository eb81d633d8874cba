//! Sample-level rendering of the voices an output device is playing

use std::time::Duration;

use super::device::{Voice, VoiceId};

struct MixerVoice {
    id: VoiceId,
    voice: Voice,
    started_frame: u64,
    phase: f32,
}

/// Sums the active voices into interleaved `f32` frames.
///
/// Each voice runs its oscillator through its gain envelope, timed from the
/// frame it was added on. Voices play until removed.
pub struct Mixer {
    sample_rate: u32,
    frame: u64,
    voices: Vec<MixerVoice>,
}

impl Mixer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            frame: 0,
            voices: Vec::new(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Start `voice` at the next rendered frame.
    pub fn add(&mut self, id: VoiceId, voice: Voice) {
        self.voices.push(MixerVoice {
            id,
            voice,
            started_frame: self.frame,
            phase: 0.0,
        });
    }

    /// Returns `false` if no voice has this id.
    pub fn remove(&mut self, id: VoiceId) -> bool {
        let before = self.voices.len();
        self.voices.retain(|v| v.id != id);
        self.voices.len() != before
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// Fill `out` with interleaved frames of `channels` samples each. Every
    /// channel carries the same mono mix.
    pub fn render(&mut self, out: &mut [f32], channels: usize) {
        let rate = self.sample_rate as f32;

        for frame in out.chunks_mut(channels.max(1)) {
            let mut mix = 0.0;
            for v in &mut self.voices {
                let elapsed = Duration::from_secs_f64(
                    (self.frame - v.started_frame) as f64 / self.sample_rate as f64,
                );
                mix += v.voice.oscillator.sample(v.phase) * v.voice.envelope.gain_at(elapsed);
                v.phase = (v.phase + v.voice.oscillator.frequency_hz / rate).fract();
            }
            frame.fill(mix.clamp(-1.0, 1.0));
            self.frame += 1;
        }
    }
}
