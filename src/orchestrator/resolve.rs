//! Ritual-kind to endpoint resolution.

use crate::types::RitualKind;
use crate::util::http::trim_trailing_slash;

/// Maps a ritual kind to the remote generation endpoint.
///
/// A trait so tests (and any future multi-region deployment) can swap
/// the table without touching the orchestrator.
pub trait EndpointResolver: Send + Sync {
    /// Full URL of the generation endpoint for `kind`.
    fn resolve(&self, kind: RitualKind) -> String;

    /// URL probed for connectivity before the first attempt.
    fn probe_url(&self) -> String;
}

/// The production table: one fixed path per ritual kind under a single
/// base URL.
#[derive(Debug, Clone)]
pub struct FixedEndpointResolver {
    base_url: String,
}

impl FixedEndpointResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn path(kind: RitualKind) -> &'static str {
        match kind {
            RitualKind::Sleep => "/sleep",
            RitualKind::Spark => "/spark",
            RitualKind::Calm => "/calm",
            RitualKind::Dream => "/dream",
        }
    }
}

impl EndpointResolver for FixedEndpointResolver {
    fn resolve(&self, kind: RitualKind) -> String {
        format!(
            "{}{}",
            trim_trailing_slash(&self.base_url),
            Self::path(kind)
        )
    }

    fn probe_url(&self) -> String {
        trim_trailing_slash(&self.base_url).to_string()
    }
}
