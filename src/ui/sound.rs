/// Sound engine: procedural cue sounds via rodio.
///
/// Every cue is synthesised into an in-memory WAV buffer at start-up and
/// played fire-and-forget through a detached `Sink`.
///
/// Built without the "sound" feature, `SoundEngine` is a stub that does
/// nothing.

use netescape::MissionEvent;

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};
    use tracing::debug;

    use netescape::Cue;

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        alert_five: Arc<Vec<u8>>,
        alert_thirty: Arc<Vec<u8>>,
        correct: Arc<Vec<u8>>,
        incorrect: Arc<Vec<u8>>,
        succeeded: Arc<Vec<u8>>,
        failed: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        /// `None` when no output device is available.
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;
            Some(SoundEngine {
                _stream: stream,
                handle,
                alert_five: Arc::new(make_wav(&gen_chime(&[880.0, 660.0], 0.18))),
                alert_thirty: Arc::new(make_wav(&gen_chime(&[988.0, 988.0, 988.0], 0.09))),
                correct: Arc::new(make_wav(&gen_chime(&[1047.0, 1319.0, 1568.0], 0.05))),
                incorrect: Arc::new(make_wav(&gen_buzz())),
                succeeded: Arc::new(make_wav(&gen_fanfare())),
                failed: Arc::new(make_wav(&gen_power_down())),
            })
        }

        pub fn play_cue(&self, cue: Cue) {
            let buf = match cue {
                Cue::AlertFiveMinute => &self.alert_five,
                Cue::AlertThirtySecond => &self.alert_thirty,
                Cue::PuzzleCorrect => &self.correct,
                Cue::PuzzleIncorrect => &self.incorrect,
                Cue::MissionSucceeded => &self.succeeded,
                Cue::MissionFailed => &self.failed,
            };
            debug!(?cue, "playing cue");
            self.play(buf);
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }
    }

    // ── Waveform generators: mono f32 samples ──

    /// A run of short notes with a soft decay, sine plus a little third
    /// harmonic.
    fn gen_chime(notes: &[f32], note_dur: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 3.0 * TAU).sin() * 0.3;
                samples.push(wave * env * 0.25);
            }
        }
        samples
    }

    /// Low square-ish buzz for a wrong answer.
    fn gen_buzz() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.25) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let square = if (t * 140.0 * TAU).sin() >= 0.0 { 1.0 } else { -1.0 };
                let env = 1.0 - i as f32 / n as f32;
                square * env * 0.15
            })
            .collect()
    }

    /// C5 E5 G5 C6 with the last note held.
    fn gen_fanfare() -> Vec<f32> {
        let mut samples = gen_chime(&[523.0, 659.0, 784.0], 0.1);
        let n = (SAMPLE_RATE as f32 * 0.35) as usize;
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - i as f32 / n as f32;
            samples.push((t * 1047.0 * TAU).sin() * env * 0.3);
        }
        samples
    }

    /// Falling sweep, like a machine shutting down.
    fn gen_power_down() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.8) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let freq = 440.0 - p * 360.0;
                phase += freq / SAMPLE_RATE as f32;
                (phase * TAU).sin() * (1.0 - p) * 0.3
            })
            .collect()
    }

    // ── WAV encoder ──

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * u32::from(num_channels) * u32::from(bits_per_sample) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_matches_sample_count() {
            let samples = gen_chime(&[440.0], 0.01);
            let wav = make_wav(&samples);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            assert_eq!(wav.len(), 44 + samples.len() * 2);
        }

        #[test]
        fn generated_samples_stay_in_range() {
            for s in gen_buzz().iter().chain(&gen_fanfare()).chain(&gen_power_down()) {
                assert!((-1.0..=1.0).contains(s));
            }
        }
    }
}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> {
        Some(SoundEngine)
    }

    pub fn play_cue(&self, _cue: netescape::Cue) {}
}

/// Play the cue of every event that has one.
pub fn play_events(sound: Option<&SoundEngine>, events: &[MissionEvent]) {
    let Some(sfx) = sound else {
        return;
    };
    for cue in events.iter().filter_map(|e| e.cue()) {
        sfx.play_cue(cue);
    }
}
