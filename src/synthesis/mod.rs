//! Text-to-speech synthesis.

pub mod elevenlabs;

pub use elevenlabs::ElevenLabsSynthesizer;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Voice;

/// Fixed voice-quality parameters for meditation narration.
///
/// Stability and similarity are pinned to maximum and the speaking rate
/// slowed to 76% of default; the annotated script plus this rate yields
/// the ~114 words/minute delivery the word-count table assumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceSettings {
    pub stability: f64,
    pub similarity_boost: f64,
    pub style: f64,
    pub speed: f64,
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 1.0,
            similarity_boost: 1.0,
            style: 0.0,
            speed: 0.76,
            use_speaker_boost: false,
        }
    }
}

/// A remote text-to-speech provider.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with the given narration voice, returning one
    /// complete audio buffer assembled from the provider's stream.
    async fn synthesize(&self, text: &str, voice: Voice) -> Result<Vec<u8>>;
}
