//! Script generation: prompt construction, the narrative provider, and
//! pacing annotation.

pub mod groq;
pub mod pause;
pub mod prompt;

pub use groq::GroqScriptProvider;
pub use pause::annotate_pauses;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Profile;

/// A remote narrative-generation provider.
///
/// One call per request; failures propagate to the caller. Retries for
/// the external path belong to the orchestrator, not this layer.
#[async_trait]
pub trait ScriptProvider: Send + Sync {
    /// Generate a personalized meditation script of roughly
    /// `word_count` words.
    async fn generate_script(&self, profile: &Profile, word_count: &str) -> Result<String>;
}
