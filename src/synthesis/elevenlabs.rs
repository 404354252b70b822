//! ElevenLabs streaming synthesis client.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tracing::debug;

use super::{SpeechSynthesizer, VoiceSettings};
use crate::error::{Result, VelaError};
use crate::types::Voice;
use crate::util::http::{shared_client, trim_trailing_slash, xi_headers};
use crate::util::timeout::with_timeout;

const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
const DEFAULT_MODEL: &str = "eleven_multilingual_v2";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Narration voice ids. Arabella for the female voice, Nicole for the
/// male selection.
const FEMALE_VOICE_ID: &str = "Z3R5wn05IrDiVCyEkUrK";
const MALE_VOICE_ID: &str = "piTKgcLEGmPE4e6mEKli";

/// Streaming TTS provider for ElevenLabs.
///
/// Chunks from the streaming endpoint are concatenated into one buffer;
/// no retry at this layer — provider errors surface as
/// `GenerationUnavailable`.
#[derive(Debug, Clone)]
pub struct ElevenLabsSynthesizer {
    api_key: String,
    base_url: String,
    model: String,
    settings: VoiceSettings,
    timeout: Duration,
}

impl ElevenLabsSynthesizer {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            settings: VoiceSettings::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn new_with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            model: DEFAULT_MODEL.to_string(),
            settings: VoiceSettings::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_settings(mut self, settings: VoiceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Resolve the narration voice to its provider voice id.
    pub fn voice_id(voice: Voice) -> &'static str {
        match voice {
            Voice::Female => FEMALE_VOICE_ID,
            Voice::Male => MALE_VOICE_ID,
        }
    }

    fn validate(&self, text: &str) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(VelaError::Configuration(
                "Missing ElevenLabs API key for speech synthesis".to_string(),
            ));
        }
        if text.trim().is_empty() {
            return Err(VelaError::InvalidArgument(
                "Speech text cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    async fn synthesize(&self, text: &str, voice: Voice) -> Result<Vec<u8>> {
        self.validate(text)?;

        let voice_id = Self::voice_id(voice);
        let url = format!(
            "{}/v1/text-to-speech/{voice_id}/stream",
            trim_trailing_slash(&self.base_url)
        );
        let payload = serde_json::json!({
            "text": text,
            "model_id": self.model,
            "voice_settings": {
                "stability": self.settings.stability,
                "similarity_boost": self.settings.similarity_boost,
                "style": self.settings.style,
                "speed": self.settings.speed,
                "use_speaker_boost": self.settings.use_speaker_boost,
            },
        });

        debug!(voice = ?voice, voice_id, "Requesting speech synthesis");

        with_timeout(self.timeout, async {
            let response = shared_client()
                .post(url)
                .headers(xi_headers(&self.api_key))
                .json(&payload)
                .send()
                .await?;

            let status = response.status().as_u16();
            if status != 200 {
                let body = response.text().await.unwrap_or_default();
                return Err(VelaError::GenerationUnavailable {
                    provider: "elevenlabs".to_string(),
                    message: format!("status {status}: {body}"),
                });
            }

            let mut audio = Vec::new();
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                audio.extend_from_slice(&chunk);
            }

            if audio.is_empty() {
                return Err(VelaError::GenerationUnavailable {
                    provider: "elevenlabs".to_string(),
                    message: "stream contained no audio".to_string(),
                });
            }

            Ok(audio)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_ids_are_fixed_per_voice() {
        assert_eq!(
            ElevenLabsSynthesizer::voice_id(Voice::Female),
            "Z3R5wn05IrDiVCyEkUrK"
        );
        assert_eq!(
            ElevenLabsSynthesizer::voice_id(Voice::Male),
            "piTKgcLEGmPE4e6mEKli"
        );
    }

    #[test]
    fn default_settings_match_the_narration_profile() {
        let s = VoiceSettings::default();
        assert_eq!(s.stability, 1.0);
        assert_eq!(s.similarity_boost, 1.0);
        assert_eq!(s.style, 0.0);
        assert_eq!(s.speed, 0.76);
        assert!(!s.use_speaker_boost);
    }
}
