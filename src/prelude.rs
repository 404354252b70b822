//! Convenience re-exports for common use.

pub use crate::config::{ExternalServiceConfig, VelaConfig};
pub use crate::error::{Result, VelaError};
pub use crate::mixer::{AssetFormat, AudioMixer, MixedAsset};
pub use crate::orchestrator::{RequestOrchestrator, RemoteOutcome};
pub use crate::persist::{
    AssetMetadata, AssetPersister, AssetReference, FilesystemPersister, PlaceholderAsset,
};
pub use crate::pipeline::{IdentityPolicy, MeditationPipeline};
pub use crate::script::{annotate_pauses, GroqScriptProvider, ScriptProvider};
pub use crate::synthesis::{ElevenLabsSynthesizer, SpeechSynthesizer};
pub use crate::types::{
    Delivery, DurationMinutes, GenerationOutcome, GenerationRequest, Profile, RitualKind,
    RitualMode, RitualParams, Tone, UserRef, Voice,
};
