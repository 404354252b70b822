//! In-memory PCM buffer and the deterministic operations the mixing
//! chain is built from. WAV decode/encode goes through `hound`; all
//! processing is on interleaved 16-bit samples.

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{Result, VelaError};

/// Interleaved 16-bit PCM audio.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub sample_rate: u32,
    pub channels: u16,
    samples: Vec<i16>,
}

impl AudioBuffer {
    pub fn new(sample_rate: u32, channels: u16, samples: Vec<i16>) -> Self {
        Self {
            sample_rate,
            channels,
            samples,
        }
    }

    /// A silent buffer of the given length.
    pub fn silence(duration_ms: u64, sample_rate: u32, channels: u16) -> Self {
        let frames = duration_ms * sample_rate as u64 / 1000;
        Self::new(
            sample_rate,
            channels,
            vec![0; (frames * channels as u64) as usize],
        )
    }

    /// Decode a WAV byte buffer. 16-bit int is taken as-is; other int
    /// widths and 32-bit float are converted.
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = WavReader::new(Cursor::new(bytes))
            .map_err(|e| VelaError::InvalidArgument(format!("unreadable WAV: {e}")))?;
        let spec = reader.spec();

        let samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 16) => reader
                .samples::<i16>()
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| VelaError::InvalidArgument(format!("corrupt WAV samples: {e}")))?,
            (SampleFormat::Int, bits) => {
                let shift = bits as i32 - 16;
                reader
                    .samples::<i32>()
                    .map(|s| {
                        s.map(|v| {
                            if shift >= 0 {
                                (v >> shift) as i16
                            } else {
                                (v << -shift) as i16
                            }
                        })
                    })
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|e| VelaError::InvalidArgument(format!("corrupt WAV samples: {e}")))?
            }
            (SampleFormat::Float, _) => reader
                .samples::<f32>()
                .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| VelaError::InvalidArgument(format!("corrupt WAV samples: {e}")))?,
        };

        Ok(Self::new(spec.sample_rate, spec.channels, samples))
    }

    /// Encode to a 16-bit PCM WAV byte buffer.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let spec = WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec)
                .map_err(|e| VelaError::InvalidState(format!("WAV encode failed: {e}")))?;
            for &sample in &self.samples {
                writer
                    .write_sample(sample)
                    .map_err(|e| VelaError::InvalidState(format!("WAV encode failed: {e}")))?;
            }
            writer
                .finalize()
                .map_err(|e| VelaError::InvalidState(format!("WAV encode failed: {e}")))?;
        }
        Ok(cursor.into_inner())
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.frames() as u64 * 1000 / self.sample_rate as u64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Slow or speed playback without pitch correction: the samples are
    /// reinterpreted at `rate * speed` and resampled back to the nominal
    /// rate, so `speed` 0.98 lengthens the audio by ~2%.
    pub fn stretch(&self, speed: f64) -> Self {
        if !(speed.is_finite()) || speed <= 0.0 || (speed - 1.0).abs() < f64::EPSILON {
            return self.clone();
        }
        let in_frames = self.frames();
        if in_frames == 0 {
            return self.clone();
        }
        let out_frames = ((in_frames as f64) / speed).round() as usize;
        let channels = self.channels as usize;
        let mut out = Vec::with_capacity(out_frames * channels);

        for frame in 0..out_frames {
            let src = frame as f64 * speed;
            let base = src.floor() as usize;
            let frac = src - base as f64;
            let next = (base + 1).min(in_frames - 1);
            for ch in 0..channels {
                let a = self.samples[base * channels + ch] as f64;
                let b = self.samples[next * channels + ch] as f64;
                out.push((a + (b - a) * frac).round() as i16);
            }
        }

        Self::new(self.sample_rate, self.channels, out)
    }

    /// Linear-interpolation resample to a new rate.
    pub fn resample_to(&self, sample_rate: u32) -> Self {
        if sample_rate == self.sample_rate || self.sample_rate == 0 {
            let mut copy = self.clone();
            copy.sample_rate = sample_rate.max(copy.sample_rate);
            return copy;
        }
        let ratio = self.sample_rate as f64 / sample_rate as f64;
        let mut stretched = self.stretch(ratio);
        stretched.sample_rate = sample_rate;
        stretched
    }

    /// Convert channel count (mono to stereo by duplication, stereo to
    /// mono by averaging).
    pub fn to_channels(&self, channels: u16) -> Self {
        if channels == self.channels || channels == 0 {
            return self.clone();
        }
        let frames = self.frames();
        let in_ch = self.channels as usize;
        let out_ch = channels as usize;
        let mut out = Vec::with_capacity(frames * out_ch);

        for frame in 0..frames {
            let start = frame * in_ch;
            let mixed: i32 = self.samples[start..start + in_ch]
                .iter()
                .map(|&s| s as i32)
                .sum::<i32>()
                / in_ch as i32;
            for ch in 0..out_ch {
                let sample = if out_ch > in_ch {
                    self.samples[start + ch.min(in_ch - 1)]
                } else {
                    mixed as i16
                };
                out.push(sample);
            }
        }

        Self::new(self.sample_rate, channels, out)
    }

    /// Prepend another buffer (assumed same rate and channel count).
    pub fn preceded_by(&self, lead: &AudioBuffer) -> Self {
        let mut samples = Vec::with_capacity(lead.samples.len() + self.samples.len());
        samples.extend_from_slice(&lead.samples);
        samples.extend_from_slice(&self.samples);
        Self::new(self.sample_rate, self.channels, samples)
    }

    /// Trim to the target length, or pad with trailing silence when the
    /// buffer is shorter.
    pub fn trim_or_pad_to_ms(&self, duration_ms: u64) -> Self {
        let target_frames = (duration_ms * self.sample_rate as u64 / 1000) as usize;
        let channels = self.channels as usize;
        let mut samples = self.samples.clone();
        samples.resize(target_frames * channels, 0);
        Self::new(self.sample_rate, self.channels, samples)
    }

    /// Apply a gain in decibels.
    pub fn gain_db(&self, db: f32) -> Self {
        let factor = 10f32.powf(db / 20.0);
        let samples = self
            .samples
            .iter()
            .map(|&s| (s as f32 * factor).clamp(i16::MIN as f32, i16::MAX as f32) as i16)
            .collect();
        Self::new(self.sample_rate, self.channels, samples)
    }

    /// Linear fade from silence over the first `duration_ms`.
    pub fn fade_in(&self, duration_ms: u64) -> Self {
        let fade_frames = (duration_ms * self.sample_rate as u64 / 1000) as usize;
        self.fade(fade_frames, true)
    }

    /// Linear fade to silence over the final `duration_ms`.
    pub fn fade_out(&self, duration_ms: u64) -> Self {
        let fade_frames = (duration_ms * self.sample_rate as u64 / 1000) as usize;
        self.fade(fade_frames, false)
    }

    fn fade(&self, fade_frames: usize, fade_in: bool) -> Self {
        let frames = self.frames();
        if frames == 0 {
            return self.clone();
        }
        let fade_frames = fade_frames.min(frames).max(1);
        let channels = self.channels as usize;
        let mut samples = self.samples.clone();

        for i in 0..fade_frames {
            let gain = i as f32 / fade_frames as f32;
            let frame = if fade_in { i } else { frames - 1 - i };
            for ch in 0..channels {
                let idx = frame * channels + ch;
                samples[idx] = (samples[idx] as f32 * gain) as i16;
            }
        }

        Self::new(self.sample_rate, self.channels, samples)
    }

    /// Overlay `other` on top of this buffer starting at time zero.
    /// The result keeps this buffer's length; excess of `other` is
    /// dropped (the base is expected to have been sized first).
    pub fn overlay(&self, other: &AudioBuffer) -> Self {
        let mut samples = self.samples.clone();
        for (i, &s) in other.samples.iter().take(samples.len()).enumerate() {
            samples[i] = samples[i].saturating_add(s);
        }
        Self::new(self.sample_rate, self.channels, samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(duration_ms: u64, rate: u32, value: i16) -> AudioBuffer {
        let frames = (duration_ms * rate as u64 / 1000) as usize;
        AudioBuffer::new(rate, 1, vec![value; frames])
    }

    #[test]
    fn wav_round_trip_preserves_shape() {
        let original = tone(100, 8000, 1000);
        let bytes = original.to_wav_bytes().unwrap();
        let decoded = AudioBuffer::from_wav_bytes(&bytes).unwrap();
        assert_eq!(decoded.sample_rate, 8000);
        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.frames(), original.frames());
    }

    #[test]
    fn stretch_below_unity_lengthens_audio() {
        let buffer = tone(1000, 8000, 500);
        let stretched = buffer.stretch(0.98);
        assert!(stretched.frames() > buffer.frames());
        // Nominal rate tag is restored, so duration grows.
        assert_eq!(stretched.sample_rate, 8000);
        assert!(stretched.duration_ms() >= 1019 && stretched.duration_ms() <= 1022);
    }

    #[test]
    fn silence_has_requested_duration() {
        let s = AudioBuffer::silence(5000, 44100, 2);
        assert_eq!(s.duration_ms(), 5000);
        assert_eq!(s.channels, 2);
    }

    #[test]
    fn trim_truncates_and_pad_extends() {
        let buffer = tone(1000, 8000, 100);
        assert_eq!(buffer.trim_or_pad_to_ms(400).duration_ms(), 400);
        assert_eq!(buffer.trim_or_pad_to_ms(2500).duration_ms(), 2500);
    }

    #[test]
    fn gain_minus_six_db_roughly_halves_amplitude() {
        let buffer = tone(10, 8000, 10000);
        let softer = buffer.gain_db(-6.0);
        let sample = softer.samples[0];
        assert!((4900..=5200).contains(&sample), "got {sample}");
    }

    #[test]
    fn fade_in_starts_silent() {
        let buffer = tone(1000, 8000, 8000);
        let faded = buffer.fade_in(500);
        assert_eq!(faded.samples[0], 0);
        // Past the fade the signal is untouched.
        assert_eq!(*faded.samples.last().unwrap(), 8000);
    }

    #[test]
    fn fade_out_ends_near_silence() {
        let buffer = tone(1000, 8000, 8000);
        let faded = buffer.fade_out(500);
        assert_eq!(*faded.samples.last().unwrap(), 0);
        assert_eq!(faded.samples[0], 8000);
    }

    #[test]
    fn fades_on_an_empty_buffer_are_no_ops() {
        let empty = AudioBuffer::new(8000, 1, Vec::new());
        assert!(empty.fade_in(500).is_empty());
        assert!(empty.fade_out(500).is_empty());
    }

    #[test]
    fn overlay_keeps_base_length_and_sums() {
        let base = tone(1000, 8000, 100);
        let over = tone(200, 8000, 50);
        let mixed = base.overlay(&over);
        assert_eq!(mixed.frames(), base.frames());
        assert_eq!(mixed.samples[0], 150);
        assert_eq!(*mixed.samples.last().unwrap(), 100);
    }

    #[test]
    fn prepend_concatenates() {
        let lead = AudioBuffer::silence(5000, 8000, 1);
        let speech = tone(1000, 8000, 300);
        let padded = speech.preceded_by(&lead);
        assert_eq!(padded.duration_ms(), 6000);
        assert_eq!(padded.samples[0], 0);
    }

    #[test]
    fn stereo_to_mono_averages() {
        let stereo = AudioBuffer::new(8000, 2, vec![100, 300, 100, 300]);
        let mono = stereo.to_channels(1);
        assert_eq!(mono.channels, 1);
        assert_eq!(mono.frames(), 2);
        assert_eq!(mono.samples[0], 200);
    }

    #[test]
    fn mono_to_stereo_duplicates() {
        let mono = AudioBuffer::new(8000, 1, vec![100, 200]);
        let stereo = mono.to_channels(2);
        assert_eq!(stereo.channels, 2);
        assert_eq!(stereo.samples, vec![100, 100, 200, 200]);
    }
}
