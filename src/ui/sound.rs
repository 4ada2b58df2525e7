/// Editor sound cues: short procedural blips played through rodio.
///
/// Every cue is rendered into an in-memory WAV buffer once at start-up.
/// Playback is fire-and-forget on a detached Sink.
///
/// Build without the `sound` feature to get a silent stub.

use crate::edit::session::EditEvent;

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        place: Arc<Vec<u8>>,
        erase: Arc<Vec<u8>>,
        select: Arc<Vec<u8>>,
        undo: Arc<Vec<u8>>,
        clear: Arc<Vec<u8>>,
        export: Arc<Vec<u8>>,
        error: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::info!("no audio output: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                place: Arc::new(make_wav(&notes(&[880.0], 0.04, 0.2))),
                erase: Arc::new(make_wav(&sweep(500.0, 200.0, 0.06, 0.5))),
                select: Arc::new(make_wav(&notes(&[1320.0], 0.025, 0.15))),
                undo: Arc::new(make_wav(&notes(&[784.0, 587.0], 0.05, 0.2))),
                clear: Arc::new(make_wav(&sweep(700.0, 120.0, 0.25, 0.3))),
                export: Arc::new(make_wav(&notes(&[523.0, 659.0, 784.0, 1047.0], 0.07, 0.25))),
                error: Arc::new(make_wav(&notes(&[196.0, 185.0], 0.09, 0.3))),
            })
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

        pub fn play_place(&self) { self.play(&self.place); }
        pub fn play_erase(&self) { self.play(&self.erase); }
        pub fn play_select(&self) { self.play(&self.select); }
        pub fn play_undo(&self) { self.play(&self.undo); }
        pub fn play_clear(&self) { self.play(&self.clear); }
        pub fn play_export(&self) { self.play(&self.export); }
        pub fn play_error(&self) { self.play(&self.error); }
    }

    // ── Waveforms: mono f32 samples ──

    /// Back-to-back notes, sine plus a touch of 3rd harmonic, each with a
    /// fast decay.
    fn notes(freqs: &[f32], note_dur: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * note_dur) as usize;
        let mut out = Vec::with_capacity(n * freqs.len());
        for &freq in freqs {
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).sqrt();
                let wave = (t * freq * TAU).sin() * 0.8 + (t * freq * 3.0 * TAU).sin() * 0.2;
                out.push(wave * env * volume);
            }
        }
        out
    }

    /// Pitch glide from `from` to `to` Hz mixed with LCG noise.
    fn sweep(from: f32, to: f32, duration: f32, noise_mix: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut rng: u32 = 0x2545_f491;
        let mut phase = 0.0f32;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let freq = from + (to - from) * p;
                phase += freq / SAMPLE_RATE as f32;
                rng = rng.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let noise = (rng >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0;
                let tone = (phase * TAU).sin();
                (tone * (1.0 - noise_mix) + noise * noise_mix) * (1.0 - p) * 0.25
            })
            .collect()
    }

    /// 16-bit mono PCM WAV.
    fn make_wav(samples: &[f32]) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS: u16 = 16;
        let block_align = CHANNELS * BITS / 8;
        let byte_rate = SAMPLE_RATE * block_align as u32;
        let data_len = samples.len() as u32 * block_align as u32;

        fn chunk(tag: &[u8], len: u32, buf: &mut Vec<u8>) {
            buf.extend_from_slice(tag);
            buf.extend_from_slice(&len.to_le_bytes());
        }

        let mut buf = Vec::with_capacity(44 + data_len as usize);

        chunk(b"RIFF", 36 + data_len, &mut buf);
        buf.extend_from_slice(b"WAVE");
        chunk(b"fmt ", 16, &mut buf);
        for field in [1u16, CHANNELS] {
            buf.extend_from_slice(&field.to_le_bytes());
        }
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&BITS.to_le_bytes());
        chunk(b"data", data_len, &mut buf);

        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_is_consistent() {
            let wav = make_wav(&notes(&[440.0], 0.01, 0.5));
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            assert_eq!(&wav[36..40], b"data");
            let riff_len = u32::from_le_bytes([wav[4], wav[5], wav[6], wav[7]]) as usize;
            assert_eq!(riff_len + 8, wav.len());
        }

        #[test]
        fn sweep_stays_in_range() {
            assert!(sweep(500.0, 100.0, 0.05, 0.5).iter().all(|s| s.abs() <= 1.0));
        }
    }
}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_place(&self) {}
    pub fn play_erase(&self) {}
    pub fn play_select(&self) {}
    pub fn play_undo(&self) {}
    pub fn play_clear(&self) {}
    pub fn play_export(&self) {}
    pub fn play_error(&self) {}
}

/// Pick the cue for an edit result. Silent when there is no engine.
pub fn play_event(sound: Option<&SoundEngine>, event: &EditEvent) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    match event {
        EditEvent::Placed { .. } => sfx.play_place(),
        EditEvent::Erased { .. } => sfx.play_erase(),
        EditEvent::TileSelected(_) | EditEvent::EraseToggled(_) => sfx.play_select(),
        EditEvent::Undone { .. } => sfx.play_undo(),
        EditEvent::Cleared => sfx.play_clear(),
        EditEvent::Exported { .. } | EditEvent::Imported { .. } | EditEvent::Resized { .. } => {
            sfx.play_export()
        }
        EditEvent::Unchanged { .. } | EditEvent::NothingToUndo => {}
    }
}

pub fn play_error(sound: Option<&SoundEngine>) {
    if let Some(sfx) = sound {
        sfx.play_error();
    }
}
