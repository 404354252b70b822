//! Configuration for Vela.
//!
//! All credentials and endpoints are held in an explicitly constructed
//! [`VelaConfig`] that callers inject into the pipeline; nothing reads
//! the environment at call time. `from_env` is the one place env
//! variables (and a local `.env` via dotenvy) are consulted.

use std::time::Duration;

use crate::error::{Result, VelaError};

/// Tunables for the external generation service exchange.
#[derive(Debug, Clone)]
pub struct ExternalServiceConfig {
    pub base_url: String,
    /// Whether the remote path is active at all. When disabled the
    /// orchestrator goes straight to the placeholder.
    pub enabled: bool,
    /// Whether to issue the lightweight connectivity probe before the
    /// first generation attempt.
    pub probe_enabled: bool,
    /// Timeout for the connectivity probe.
    pub probe_timeout: Duration,
    /// Timeout for each generation POST. The service renders audio
    /// synchronously, so this is tens of seconds.
    pub request_timeout: Duration,
    /// Attempts per payload shape, including the first.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub retry_delay: Duration,
}

impl Default for ExternalServiceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            enabled: true,
            probe_enabled: true,
            probe_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(90),
            max_attempts: 3,
            retry_delay: Duration::from_secs(2),
        }
    }
}

/// Top-level configuration: provider credentials plus timeouts.
#[derive(Debug, Clone, Default)]
pub struct VelaConfig {
    pub groq_api_key: Option<String>,
    pub elevenlabs_api_key: Option<String>,
    pub external: ExternalServiceConfig,
}

impl VelaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the environment (`.env` honored).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let mut external = ExternalServiceConfig::default();
        if let Ok(url) = std::env::var("MEDITATION_API_BASE_URL") {
            external.base_url = url;
        }
        if let Ok(timeout) = std::env::var("MEDITATION_API_TIMEOUT") {
            if let Ok(secs) = timeout.parse::<u64>() {
                external.request_timeout = Duration::from_secs(secs);
            }
        }
        if let Ok(enabled) = std::env::var("EXTERNAL_MEDITATION_API_ENABLED") {
            external.enabled = enabled.eq_ignore_ascii_case("true");
        }

        Self {
            groq_api_key: std::env::var("GROQ_API_KEY").ok(),
            elevenlabs_api_key: std::env::var("ELEVENLABS_API_KEY").ok(),
            external,
        }
    }

    pub fn with_groq_api_key(mut self, key: impl Into<String>) -> Self {
        self.groq_api_key = Some(key.into());
        self
    }

    pub fn with_elevenlabs_api_key(mut self, key: impl Into<String>) -> Self {
        self.elevenlabs_api_key = Some(key.into());
        self
    }

    pub fn with_external(mut self, external: ExternalServiceConfig) -> Self {
        self.external = external;
        self
    }

    /// Groq key or a configuration error naming the missing variable.
    pub fn require_groq_key(&self) -> Result<&str> {
        self.groq_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| VelaError::Configuration("GROQ_API_KEY is not set".to_string()))
    }

    /// ElevenLabs key or a configuration error naming the missing variable.
    pub fn require_elevenlabs_key(&self) -> Result<&str> {
        self.elevenlabs_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| VelaError::Configuration("ELEVENLABS_API_KEY is not set".to_string()))
    }
}
