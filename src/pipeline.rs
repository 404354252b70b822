//! End-to-end meditation generation.
//!
//! Two variants share one pipeline type: the local path (script →
//! pacing → synthesis → mix → persist) whose failures propagate, and
//! the remote path (external service exchange) which prefers degrading
//! to the placeholder over failing.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::VelaConfig;
use crate::error::{Result, VelaError};
use crate::mixer::{AssetFormat, AudioMixer, MixedAsset};
use crate::orchestrator::{RemoteOutcome, RequestOrchestrator};
use crate::persist::{asset_file_name, AssetMetadata, AssetPersister, AssetReference, PlaceholderAsset};
use crate::script::{annotate_pauses, GroqScriptProvider, ScriptProvider};
use crate::synthesis::{ElevenLabsSynthesizer, SpeechSynthesizer};
use crate::types::{Delivery, GenerationOutcome, GenerationRequest};

/// What to do when a request carries no user reference.
///
/// An explicit policy rather than a silent anonymous substitution; the
/// product decides, not the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentityPolicy {
    /// Reject requests without an identity.
    #[default]
    Require,
    /// Proceed without one.
    AllowAnonymous,
}

/// The top-level generation pipeline.
pub struct MeditationPipeline {
    script: Arc<dyn ScriptProvider>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    mixer: AudioMixer,
    orchestrator: RequestOrchestrator,
    persister: Arc<dyn AssetPersister>,
    placeholder: PlaceholderAsset,
    identity_policy: IdentityPolicy,
}

impl MeditationPipeline {
    /// Assemble the production pipeline from configuration.
    pub fn from_config(
        config: &VelaConfig,
        mixer: AudioMixer,
        persister: Arc<dyn AssetPersister>,
    ) -> Result<Self> {
        let script = GroqScriptProvider::new(config.require_groq_key()?.to_string());
        let synthesizer =
            ElevenLabsSynthesizer::new(config.require_elevenlabs_key()?.to_string());
        Ok(Self::new(
            Arc::new(script),
            Arc::new(synthesizer),
            mixer,
            RequestOrchestrator::new(config.external.clone()),
            persister,
        ))
    }

    /// Assemble from explicit components (used by tests and callers
    /// wiring their own providers).
    pub fn new(
        script: Arc<dyn ScriptProvider>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        mixer: AudioMixer,
        orchestrator: RequestOrchestrator,
        persister: Arc<dyn AssetPersister>,
    ) -> Self {
        Self {
            script,
            synthesizer,
            mixer,
            orchestrator,
            persister,
            placeholder: PlaceholderAsset::default(),
            identity_policy: IdentityPolicy::default(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: PlaceholderAsset) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn with_identity_policy(mut self, policy: IdentityPolicy) -> Self {
        self.identity_policy = policy;
        self
    }

    fn check_identity(&self, request: &GenerationRequest) -> Result<()> {
        if self.identity_policy == IdentityPolicy::Require && request.user.is_none() {
            return Err(VelaError::InvalidArgument(
                "an authenticated user reference is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Local generation: narrative, pacing, synthesis, mixing, storage.
    ///
    /// Provider failures on this path are hard errors; there is no
    /// placeholder substitution here.
    pub async fn generate_local(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        self.check_identity(request)?;

        let word_count = request.params.duration.target_word_count();
        let script = self
            .script
            .generate_script(&request.profile, word_count)
            .await?;
        let annotated = annotate_pauses(&script);

        let speech = self
            .synthesizer
            .synthesize(&annotated, request.params.voice)
            .await?;

        let mixed = self.mix_blocking(speech).await?;

        info!(
            kind = %request.kind,
            mixed = mixed.mixed,
            bytes = mixed.bytes.len(),
            "Local generation complete"
        );

        let asset = self.persist(request, &mixed.bytes, mixed.format).await;
        Ok(GenerationOutcome {
            asset,
            delivery: Delivery::Generated,
        })
    }

    /// Remote generation through the external service, with the
    /// delivery guarantee: persistent unavailability yields the
    /// placeholder, marked degraded, instead of an error.
    pub async fn generate_remote(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        self.check_identity(request)?;

        let exchange = match self.orchestrator.run(request).await {
            Ok(exchange) => exchange,
            Err(e) => {
                // Terminal failure still leaves an inspectable record
                // before the error is reported upward.
                warn!(kind = %request.kind, error = %e, "Remote generation failed terminally");
                self.persist_placeholder(request).await;
                return Err(e);
            }
        };

        match exchange.outcome {
            RemoteOutcome::Audio(bytes) => {
                let format = if bytes.starts_with(b"RIFF") {
                    AssetFormat::Wav
                } else {
                    AssetFormat::Mp3
                };
                let asset = self.persist(request, &bytes, format).await;
                Ok(GenerationOutcome {
                    asset,
                    delivery: Delivery::Generated,
                })
            }
            RemoteOutcome::FileReference(url) => {
                // The service stored the asset itself; pass its
                // reference through.
                let id = url
                    .rsplit('/')
                    .next()
                    .and_then(|name| name.rsplit_once('.').map(|(stem, _)| stem.to_string()))
                    .unwrap_or_else(|| url.clone());
                Ok(GenerationOutcome {
                    asset: AssetReference { id, url },
                    delivery: Delivery::Generated,
                })
            }
            RemoteOutcome::Fallback(reason) => {
                info!(kind = %request.kind, ?reason, "Delivering placeholder");
                let asset = self.persist_placeholder(request).await;
                Ok(GenerationOutcome {
                    asset,
                    delivery: Delivery::Placeholder,
                })
            }
        }
    }

    async fn mix_blocking(&self, speech: Vec<u8>) -> Result<MixedAsset> {
        let mixer = self.mixer.clone();
        tokio::task::spawn_blocking(move || mixer.mix(&speech))
            .await
            .map_err(|e| VelaError::InvalidState(format!("mixing task failed: {e}")))?
    }

    async fn persist(
        &self,
        request: &GenerationRequest,
        bytes: &[u8],
        format: AssetFormat,
    ) -> AssetReference {
        let name = asset_file_name(request.kind, format);
        let metadata = AssetMetadata::from_request(request.kind, &request.params);
        self.persister.store(bytes, &name, &metadata).await
    }

    async fn persist_placeholder(&self, request: &GenerationRequest) -> AssetReference {
        let format = self.placeholder.format();
        self.persist(request, self.placeholder.bytes(), format)
            .await
    }

    /// Look up an earlier asset by identifier.
    pub async fn asset_reference(&self, id: &str) -> Option<AssetReference> {
        self.persister.reference(id).await
    }
}
