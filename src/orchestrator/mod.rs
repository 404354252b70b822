//! Orchestration of the external generation service exchange.
//!
//! The service is independently operated and occasionally slow or
//! malformed; the orchestrator's job is to guarantee a usable result
//! regardless. Per request it resolves the endpoint, optionally probes
//! connectivity, then walks candidate payload shapes, each with a
//! bounded retry loop, classifying every 200 body before any text
//! decoding. Persistent unavailability degrades to the placeholder
//! rather than failing.

pub mod classify;
pub mod payload;
pub mod resolve;

pub use classify::{classify, Classification};
pub use payload::PayloadShape;
pub use resolve::{EndpointResolver, FixedEndpointResolver};

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, warn};

use crate::config::ExternalServiceConfig;
use crate::error::{Result, VelaError};
use crate::types::GenerationRequest;
use crate::util::http::{shared_client, status_to_error};
use crate::util::retry::RetryPolicy;
use crate::util::timeout::with_timeout;

/// Why the orchestrator fell back to the placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The remote path is disabled by configuration.
    Disabled,
    /// The connectivity probe could not reach the service.
    Unreachable,
    /// Every attempt failed with a retryable (transient) error.
    AttemptsExhausted,
    /// The service accepted the request but returned no audio and no
    /// file reference.
    NoAudioInResponse,
}

/// Terminal result of the exchange.
#[derive(Debug)]
pub enum RemoteOutcome {
    /// The service returned raw audio.
    Audio(Vec<u8>),
    /// The service stored the asset itself and returned a reference.
    FileReference(String),
    /// The placeholder must be substituted.
    Fallback(FallbackReason),
}

/// One (payload shape, endpoint) pairing tried against the service.
#[derive(Debug, Clone)]
pub struct ExternalAttempt {
    pub shape: PayloadShape,
    pub endpoint: String,
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    SuccessBinary,
    SuccessStructured,
    RetryableError(String),
    TerminalError(String),
}

/// The full exchange record: outcome plus every attempt made.
#[derive(Debug)]
pub struct RemoteExchange {
    pub outcome: RemoteOutcome,
    pub attempts: Vec<ExternalAttempt>,
}

/// Drives the end-to-end exchange with the external generation service.
pub struct RequestOrchestrator<R = FixedEndpointResolver> {
    resolver: R,
    config: ExternalServiceConfig,
}

impl RequestOrchestrator<FixedEndpointResolver> {
    /// Orchestrator with the production endpoint table.
    pub fn new(config: ExternalServiceConfig) -> Self {
        let resolver = FixedEndpointResolver::new(config.base_url.clone());
        Self { resolver, config }
    }
}

impl<R: EndpointResolver> RequestOrchestrator<R> {
    pub fn with_resolver(resolver: R, config: ExternalServiceConfig) -> Self {
        Self { resolver, config }
    }

    /// Run the full exchange for one request.
    ///
    /// Returns `Ok` with either audio, a file reference, or a fallback
    /// decision; `Err` only for terminal failures (every payload shape
    /// rejected, or an unclassifiable body with no shapes left).
    pub async fn run(&self, request: &GenerationRequest) -> Result<RemoteExchange> {
        let mut attempts = Vec::new();

        if !self.config.enabled {
            info!("External generation disabled; using placeholder");
            return Ok(RemoteExchange {
                outcome: RemoteOutcome::Fallback(FallbackReason::Disabled),
                attempts,
            });
        }

        let endpoint = self.resolver.resolve(request.kind);

        if self.config.probe_enabled && !self.probe().await {
            warn!(endpoint = %endpoint, "External service unreachable; using placeholder");
            return Ok(RemoteExchange {
                outcome: RemoteOutcome::Fallback(FallbackReason::Unreachable),
                attempts,
            });
        }

        let retry = RetryPolicy::new(self.config.max_attempts, self.config.retry_delay);
        let mut last_terminal: Option<VelaError> = None;

        for shape in PayloadShape::candidates() {
            let body = shape.build(request);
            debug!(?shape, endpoint = %endpoint, "Sending generation request");

            let sent = retry
                .execute(|| self.send_once(&endpoint, &body))
                .await;

            match sent {
                Ok((content_type, bytes)) => {
                    match classify(content_type.as_deref(), &bytes) {
                        Classification::BinaryAudio => {
                            info!(?shape, bytes = bytes.len(), "Received binary audio");
                            attempts.push(ExternalAttempt {
                                shape,
                                endpoint: endpoint.clone(),
                                outcome: AttemptOutcome::SuccessBinary,
                            });
                            return Ok(RemoteExchange {
                                outcome: RemoteOutcome::Audio(bytes),
                                attempts,
                            });
                        }
                        Classification::Structured(value) => {
                            attempts.push(ExternalAttempt {
                                shape,
                                endpoint: endpoint.clone(),
                                outcome: AttemptOutcome::SuccessStructured,
                            });
                            if let Some(reference) = extract_file_reference(&value) {
                                info!(?shape, %reference, "Service returned a file reference");
                                return Ok(RemoteExchange {
                                    outcome: RemoteOutcome::FileReference(reference),
                                    attempts,
                                });
                            }
                            warn!(?shape, "Accepted without audio; using placeholder");
                            return Ok(RemoteExchange {
                                outcome: RemoteOutcome::Fallback(FallbackReason::NoAudioInResponse),
                                attempts,
                            });
                        }
                        Classification::Ambiguous => {
                            // Terminal for this shape; an alternate shape
                            // may still elicit a well-formed answer.
                            warn!(?shape, "Unclassifiable 200 body");
                            attempts.push(ExternalAttempt {
                                shape,
                                endpoint: endpoint.clone(),
                                outcome: AttemptOutcome::TerminalError(
                                    "unclassifiable body".to_string(),
                                ),
                            });
                            last_terminal = Some(VelaError::ClassificationAmbiguous(
                                "response body is neither audio nor JSON".to_string(),
                            ));
                        }
                    }
                }
                Err(e) if e.is_retryable() => {
                    // The retry loop is already exhausted; sustained
                    // unavailability escalates straight to fallback.
                    warn!(?shape, error = %e, "Attempts exhausted; using placeholder");
                    attempts.push(ExternalAttempt {
                        shape,
                        endpoint: endpoint.clone(),
                        outcome: AttemptOutcome::RetryableError(e.to_string()),
                    });
                    return Ok(RemoteExchange {
                        outcome: RemoteOutcome::Fallback(FallbackReason::AttemptsExhausted),
                        attempts,
                    });
                }
                Err(e @ VelaError::ValidationRejected(_)) => {
                    debug!(?shape, error = %e, "Shape rejected; trying next");
                    attempts.push(ExternalAttempt {
                        shape,
                        endpoint: endpoint.clone(),
                        outcome: AttemptOutcome::TerminalError(e.to_string()),
                    });
                    last_terminal = Some(e);
                }
                Err(e) => {
                    attempts.push(ExternalAttempt {
                        shape,
                        endpoint: endpoint.clone(),
                        outcome: AttemptOutcome::TerminalError(e.to_string()),
                    });
                    return Err(e);
                }
            }
        }

        Err(last_terminal.unwrap_or_else(|| {
            VelaError::ValidationRejected("every payload shape was rejected".to_string())
        }))
    }

    /// Lightweight connectivity check. Any well-formed HTTP answer from
    /// the alive set counts as reachable; connection and timeout errors
    /// do not.
    async fn probe(&self) -> bool {
        let url = self.resolver.probe_url();
        let result = with_timeout(self.config.probe_timeout, async {
            let response = shared_client().get(&url).send().await?;
            Ok(response.status().as_u16())
        })
        .await;

        match result {
            Ok(status) => {
                let alive = matches!(status, 200..=299 | 404 | 405 | 422);
                debug!(%url, status, alive, "Probe completed");
                alive
            }
            Err(e) => {
                debug!(%url, error = %e, "Probe failed");
                false
            }
        }
    }

    /// One POST with its own timeout. 200 returns the declared
    /// content-type and raw bytes; 422 is a validation rejection; any
    /// other status maps through `status_to_error`.
    async fn send_once(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<(Option<String>, Vec<u8>)> {
        with_timeout(self.config.request_timeout, async {
            let response = shared_client().post(endpoint).json(body).send().await?;

            let status = response.status().as_u16();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string());

            if status != 200 {
                let text = response.text().await.unwrap_or_default();
                return Err(status_to_error(status, &text));
            }

            let bytes = response.bytes().await?;
            Ok((content_type, bytes.to_vec()))
        })
        .await
    }
}

/// Pull a file reference out of a structured acknowledgement.
fn extract_file_reference(value: &serde_json::Value) -> Option<String> {
    const KEYS: [&str; 4] = ["file", "file_url", "url", "audio_url"];

    for key in KEYS {
        if let Some(s) = value.get(key).and_then(|v| v.as_str()) {
            if !s.trim().is_empty() {
                return Some(s.to_string());
            }
        }
    }
    // Some revisions of the service nest the reference under "data".
    value
        .get("data")
        .and_then(|data| KEYS.iter().find_map(|key| data.get(*key)))
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_reference_found_at_top_level_and_nested() {
        let v = serde_json::json!({"file": "out.mp3"});
        assert_eq!(extract_file_reference(&v).as_deref(), Some("out.mp3"));

        let v = serde_json::json!({"data": {"file_url": "http://x/a.mp3"}});
        assert_eq!(
            extract_file_reference(&v).as_deref(),
            Some("http://x/a.mp3")
        );
    }

    #[test]
    fn acknowledgement_without_reference_yields_none() {
        let v = serde_json::json!({"status": "accepted"});
        assert_eq!(extract_file_reference(&v), None);

        let v = serde_json::json!({"file": ""});
        assert_eq!(extract_file_reference(&v), None);
    }
}
