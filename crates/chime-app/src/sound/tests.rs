#[cfg(test)]
mod alarm_sound_tests {
    use super::super::{AlarmSound, AudioDevice, AudioOutput, DeviceError, RecordingDevice, SoundError};
    use super::super::device::DeviceEvent;
    use crate::event_manager::EventManager;
    use crate::events::{ChimeEvent, SoundEventType};
    use chime_core::models::{BeepPattern, Waveform};
    use std::collections::HashSet;
    use std::sync::Arc;
    use tokio::time::{sleep, Duration};

    fn create_sound(device: Arc<RecordingDevice>) -> AlarmSound {
        AlarmSound::new(
            Arc::new(AudioOutput::with_device(device)),
            BeepPattern::default(),
            Arc::new(EventManager::new()),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_beeps_every_500ms() {
        let device = Arc::new(RecordingDevice::new());
        let sound = create_sound(device.clone());

        sound.start().await.unwrap();
        assert!(sound.is_playing());
        assert_eq!(device.started_count(), 1);

        sleep(Duration::from_millis(1200)).await;
        assert_eq!(device.started_count(), 3);

        sound.stop().await;
        sleep(Duration::from_secs(2)).await;
        assert_eq!(device.started_count(), 3);
        assert_eq!(device.active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_keeps_one_timer() {
        let device = Arc::new(RecordingDevice::new());
        let sound = create_sound(device.clone());

        sound.start().await.unwrap();
        sound.start().await.unwrap();
        assert_eq!(device.started_count(), 1);

        sleep(Duration::from_millis(1200)).await;
        assert_eq!(device.started_count(), 3);

        // One stop silences it
        sound.stop().await;
        assert!(!sound.is_playing());
        sleep(Duration::from_secs(3)).await;
        assert_eq!(device.started_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_when_idle_is_noop() {
        let event_manager = Arc::new(EventManager::new());
        let mut events = event_manager.subscribe();
        let device = Arc::new(RecordingDevice::new());
        let sound = AlarmSound::new(
            Arc::new(AudioOutput::with_device(device.clone())),
            BeepPattern::default(),
            event_manager,
        )
        .unwrap();

        sound.stop().await;
        sound.stop().await;
        assert!(!sound.is_playing());
        assert_eq!(device.started_count(), 0);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_beep_runs_out_after_stop() {
        let device = Arc::new(RecordingDevice::new());
        let sound = create_sound(device.clone());

        sound.start().await.unwrap();
        sleep(Duration::from_millis(100)).await;
        sound.stop().await;
        assert_eq!(device.active_count(), 1);

        sleep(Duration::from_millis(150)).await;
        assert_eq!(device.active_count(), 0);
        assert_eq!(device.started_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_beep_is_a_fresh_voice() {
        let device = Arc::new(RecordingDevice::new());
        let sound = create_sound(device.clone());

        sound.start().await.unwrap();
        sleep(Duration::from_millis(1100)).await;
        sound.stop().await;

        let started: Vec<_> = device
            .events()
            .into_iter()
            .filter_map(|e| match e {
                DeviceEvent::Started { id, voice } => Some((id, voice)),
                DeviceEvent::Stopped { .. } => None,
            })
            .collect();
        assert_eq!(started.len(), 3);

        let ids: HashSet<u64> = started.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids.len(), 3);

        for (_, voice) in started {
            assert_eq!(voice.oscillator.waveform, Waveform::Sine);
            assert_eq!(voice.oscillator.frequency_hz, 800.0);
            assert_eq!(voice.envelope.ramp_ms, 200);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop() {
        let device = Arc::new(RecordingDevice::new());
        let sound = create_sound(device.clone());

        sound.start().await.unwrap();
        sound.stop().await;
        sound.start().await.unwrap();
        assert!(sound.is_playing());
        assert_eq!(device.started_count(), 2);

        sleep(Duration::from_millis(600)).await;
        assert_eq!(device.started_count(), 3);
        sound.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_playing_flag_is_observable() {
        let sound = create_sound(Arc::new(RecordingDevice::new()));
        let mut playing = sound.subscribe_playing();
        assert!(!*playing.borrow());

        sound.start().await.unwrap();
        playing.changed().await.unwrap();
        assert!(*playing.borrow_and_update());

        sound.stop().await;
        playing.changed().await.unwrap();
        assert!(!*playing.borrow_and_update());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_stop_events() {
        let event_manager = Arc::new(EventManager::new());
        let mut events = event_manager.subscribe();
        let sound = AlarmSound::new(
            Arc::new(AudioOutput::with_device(Arc::new(RecordingDevice::new()))),
            BeepPattern::default(),
            event_manager,
        )
        .unwrap();

        sound.start().await.unwrap();
        sound.stop().await;

        let mut types = Vec::new();
        for _ in 0..2 {
            match events.recv().await.unwrap() {
                ChimeEvent::Sound(event) => types.push(event.event_type),
                other => panic!("Expected sound event, got {:?}", other),
            }
        }
        assert_eq!(types, vec![SoundEventType::Started, SoundEventType::Stopped]);
    }

    #[tokio::test]
    async fn test_device_failure_leaves_idle() {
        let output = AudioOutput::new(|| {
            Err(DeviceError::Unavailable("no output device".to_string()))
        });
        let sound = AlarmSound::new(
            Arc::new(output),
            BeepPattern::default(),
            Arc::new(EventManager::new()),
        )
        .unwrap();

        let result = sound.start().await;
        assert!(matches!(result, Err(SoundError::Device(_))));
        assert!(!sound.is_playing());
    }

    #[tokio::test]
    async fn test_device_opened_lazily() {
        let output = Arc::new(AudioOutput::new(|| {
            Ok(Arc::new(RecordingDevice::new()) as Arc<dyn AudioDevice>)
        }));
        let sound = AlarmSound::new(
            output.clone(),
            BeepPattern::default(),
            Arc::new(EventManager::new()),
        )
        .unwrap();

        assert!(!output.is_open());
        sound.start().await.unwrap();
        assert!(output.is_open());
        sound.stop().await;
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let pattern = BeepPattern {
            duration_ms: 0,
            ..BeepPattern::default()
        };
        let result = AlarmSound::new(
            Arc::new(AudioOutput::with_device(Arc::new(RecordingDevice::new()))),
            pattern,
            Arc::new(EventManager::new()),
        );
        assert!(result.is_err());
    }
}
