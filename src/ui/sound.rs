/// Sound engine: procedural 8-bit style sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile with `--no-default-features` or without the "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_jump: Arc<Vec<u8>>,
        sfx_coin: Arc<Vec<u8>>,
        sfx_shot: Arc<Vec<u8>>,
        sfx_kill: Arc<Vec<u8>>,
        sfx_die: Arc<Vec<u8>>,
        sfx_clear: Arc<Vec<u8>>,
        sfx_win: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            let sfx_jump = Arc::new(make_wav(&gen_sweep(220.0, 620.0, 0.12, 0.25)));
            let sfx_coin = Arc::new(make_wav(&gen_arpeggio(&[1047.0, 1319.0, 1568.0], 0.045)));
            let sfx_shot = Arc::new(make_wav(&gen_sweep(1400.0, 300.0, 0.08, 0.2)));
            let sfx_kill = Arc::new(make_wav(&gen_sweep(500.0, 90.0, 0.18, 0.3)));
            let sfx_die = Arc::new(make_wav(&gen_sweep(600.0, 60.0, 0.55, 0.3)));
            let sfx_clear = Arc::new(make_wav(&gen_arpeggio(
                &[523.0, 659.0, 784.0, 1047.0, 1319.0],
                0.09,
            )));
            let sfx_win = Arc::new(make_wav(&gen_arpeggio(
                &[392.0, 523.0, 659.0, 784.0, 659.0, 784.0, 1047.0, 1568.0],
                0.14,
            )));

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_jump,
                sfx_coin,
                sfx_shot,
                sfx_kill,
                sfx_die,
                sfx_clear,
                sfx_win,
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play_jump(&self) { self.play(&self.sfx_jump); }
        pub fn play_coin(&self) { self.play(&self.sfx_coin); }
        pub fn play_shot(&self) { self.play(&self.sfx_shot); }
        pub fn play_kill(&self) { self.play(&self.sfx_kill); }
        pub fn play_die(&self) { self.play(&self.sfx_die); }
        pub fn play_clear(&self) { self.play(&self.sfx_clear); }
        pub fn play_win(&self) { self.play(&self.sfx_win); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators — all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// Linear frequency sweep with a fade-out envelope.
    fn gen_sweep(f0: f32, f1: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = f0 + (f1 - f0) * t;
                phase += freq * 2.0 * std::f32::consts::PI / SAMPLE_RATE as f32;
                let env = 1.0 - t;
                // Sine + 3rd harmonic for a square-ish retro feel
                (phase.sin() * 0.7 + (phase * 3.0).sin() * 0.3) * env * volume
            })
            .collect()
    }

    /// Quick ascending arpeggio, one note after another.
    fn gen_arpeggio(notes: &[f32], note_dur: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.7
                    + (t * freq * 3.0 * 2.0 * std::f32::consts::PI).sin() * 0.3;
                samples.push(wave * env * 0.25);
            }
        }
        samples
    }

    /// Wrap mono f32 samples into a 16-bit PCM WAV byte buffer.
    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let mut out = Vec::with_capacity(44 + data_len as usize);

        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVE");

        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        out.extend_from_slice(&1u16.to_le_bytes()); // PCM
        out.extend_from_slice(&1u16.to_le_bytes()); // mono
        out.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        out.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes()); // byte rate
        out.extend_from_slice(&2u16.to_le_bytes()); // block align
        out.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            out.extend_from_slice(&v.to_le_bytes());
        }
        out
    }
}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

/// Stub engine when the "sound" feature is disabled.
#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> {
        None
    }

    pub fn play_jump(&self) {}
    pub fn play_coin(&self) {}
    pub fn play_shot(&self) {}
    pub fn play_kill(&self) {}
    pub fn play_die(&self) {}
    pub fn play_clear(&self) {}
    pub fn play_win(&self) {}
}
