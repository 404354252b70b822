//! Groq narrative provider (OpenAI-compatible chat completions).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::prompt::build_prompt;
use super::ScriptProvider;
use crate::error::{Result, VelaError};
use crate::types::Profile;
use crate::util::http::{bearer_headers, shared_client, trim_trailing_slash};
use crate::util::timeout::with_timeout;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "gemma2-9b-it";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Narrative-generation provider backed by Groq's chat completions API.
///
/// One call per request, no retry at this layer: a provider failure is a
/// hard `GenerationUnavailable` for the local pipeline.
#[derive(Debug, Clone)]
pub struct GroqScriptProvider {
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl GroqScriptProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn new_with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(VelaError::Configuration(
                "Missing Groq API key for script generation".to_string(),
            ));
        }
        Ok(())
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt}
            ],
        });

        let url = format!("{}/chat/completions", trim_trailing_slash(&self.base_url));
        let headers = bearer_headers(&self.api_key);

        debug!(model = %self.model, "Requesting script generation");

        with_timeout(self.timeout, async {
            let response = shared_client()
                .post(url)
                .headers(headers)
                .json(&payload)
                .send()
                .await?;

            let status = response.status().as_u16();
            let body = response.text().await?;
            if status != 200 {
                return Err(VelaError::GenerationUnavailable {
                    provider: "groq".to_string(),
                    message: format!("status {status}: {body}"),
                });
            }

            let parsed: ChatCompletionResponse =
                serde_json::from_str(&body).map_err(|e| VelaError::GenerationUnavailable {
                    provider: "groq".to_string(),
                    message: format!("unreadable completion body: {e}"),
                })?;

            let script = parsed
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .unwrap_or_default();

            if script.trim().is_empty() {
                return Err(VelaError::GenerationUnavailable {
                    provider: "groq".to_string(),
                    message: "completion contained no script text".to_string(),
                });
            }

            Ok(script)
        })
        .await
    }
}

#[async_trait]
impl ScriptProvider for GroqScriptProvider {
    async fn generate_script(&self, profile: &Profile, word_count: &str) -> Result<String> {
        self.validate()?;
        let prompt = build_prompt(profile, word_count);
        self.complete(&prompt).await
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}
