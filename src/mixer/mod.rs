//! Deterministic audio post-processing.
//!
//! The mix is a fixed chain: slow the speech slightly, give it a silent
//! lead-in, size the background track to the speech, balance levels,
//! fade the background, overlay, and export compressed. Mixing is a
//! best-effort enhancement: when a stage is unavailable the unmodified
//! speech buffer is delivered instead of failing the pipeline.

pub mod buffer;
pub mod transcode;

pub use buffer::AudioBuffer;

use tracing::{debug, warn};

use crate::error::{Result, VelaError};

/// Playback-speed factor applied to speech (2% slower, no pitch
/// correction).
const SPEECH_STRETCH: f64 = 0.98;
/// Silence prepended to the speech.
const LEAD_IN_MS: u64 = 5_000;
/// Background extends this far past the speech.
const TAIL_MS: u64 = 20_000;
/// Level adjustments.
const SPEECH_GAIN_DB: f32 = -4.0;
const MUSIC_GAIN_DB: f32 = -6.0;
/// Background fade lengths.
const FADE_IN_MS: u64 = 3_000;
const FADE_OUT_MS: u64 = 20_000;

/// Delivery container of a mixed asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetFormat {
    Mp3,
    Wav,
}

impl AssetFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }
}

/// Final byte buffer plus its container format. `mixed` is false when
/// the chain degraded and the bytes are the untouched speech input.
#[derive(Debug, Clone)]
pub struct MixedAsset {
    pub bytes: Vec<u8>,
    pub format: AssetFormat,
    pub mixed: bool,
}

/// Mixes synthesized speech with the fixed background track.
#[derive(Debug, Clone)]
pub struct AudioMixer {
    background: Vec<u8>,
}

impl AudioMixer {
    /// Mixer over the given background track bytes (WAV or mp3).
    pub fn new(background: Vec<u8>) -> Self {
        Self { background }
    }

    /// Load the background track from disk.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::new(std::fs::read(path)?))
    }

    /// Run the full chain. Never fails outright: any unavailable stage
    /// returns the unmodified speech buffer marked unmixed.
    pub fn mix(&self, speech: &[u8]) -> Result<MixedAsset> {
        if speech.is_empty() {
            return Err(VelaError::InvalidArgument(
                "speech buffer cannot be empty".to_string(),
            ));
        }

        match self.try_mix(speech) {
            Ok(asset) => Ok(asset),
            Err(e) => {
                warn!(error = %e, "Mixing unavailable; delivering unmixed speech");
                Ok(MixedAsset {
                    bytes: speech.to_vec(),
                    format: sniff_format(speech),
                    mixed: false,
                })
            }
        }
    }

    fn try_mix(&self, speech: &[u8]) -> Result<MixedAsset> {
        let speech_pcm = decode(speech)?;
        let music_pcm = decode(&self.background)?
            .resample_to(speech_pcm.sample_rate)
            .to_channels(speech_pcm.channels);

        let speech_pcm = speech_pcm
            .stretch(SPEECH_STRETCH)
            .preceded_by(&AudioBuffer::silence(
                LEAD_IN_MS,
                speech_pcm.sample_rate,
                speech_pcm.channels,
            ))
            .gain_db(SPEECH_GAIN_DB);

        let music_pcm = music_pcm
            .trim_or_pad_to_ms(speech_pcm.duration_ms() + TAIL_MS)
            .gain_db(MUSIC_GAIN_DB)
            .fade_in(FADE_IN_MS)
            .fade_out(FADE_OUT_MS);

        let combined = music_pcm.overlay(&speech_pcm);
        debug!(
            speech_ms = speech_pcm.duration_ms(),
            combined_ms = combined.duration_ms(),
            "Mixed speech over background"
        );

        let wav = combined.to_wav_bytes()?;
        match transcode::encode_wav_to_mp3(&wav) {
            Ok(mp3) => Ok(MixedAsset {
                bytes: mp3,
                format: AssetFormat::Mp3,
                mixed: true,
            }),
            Err(e) => {
                // The mix itself succeeded; deliver it uncompressed.
                warn!(error = %e, "mp3 encode unavailable; delivering WAV mix");
                Ok(MixedAsset {
                    bytes: wav,
                    format: AssetFormat::Wav,
                    mixed: true,
                })
            }
        }
    }
}

/// Decode speech or background bytes to PCM: WAV directly, anything
/// else through ffmpeg.
fn decode(bytes: &[u8]) -> Result<AudioBuffer> {
    if bytes.starts_with(b"RIFF") {
        return AudioBuffer::from_wav_bytes(bytes);
    }
    let wav = transcode::decode_to_wav(bytes)?;
    AudioBuffer::from_wav_bytes(&wav)
}

fn sniff_format(bytes: &[u8]) -> AssetFormat {
    if bytes.starts_with(b"RIFF") {
        AssetFormat::Wav
    } else {
        AssetFormat::Mp3
    }
}
