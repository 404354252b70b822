//! Error types for Vela.

use thiserror::Error;

/// Primary error type for all Vela operations.
#[derive(Error, Debug)]
pub enum VelaError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Generation unavailable: {provider} — {message}")]
    GenerationUnavailable { provider: String, message: String },

    #[error("Validation rejected by remote service: {0}")]
    ValidationRejected(String),

    #[error("Response classification ambiguous: {0}")]
    ClassificationAmbiguous(String),

    #[error("Mixing unavailable: {0}")]
    MixingUnavailable(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Coarse error category used for retry decisions and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Timeout,
    Server,
    Validation,
    Generation,
    Classification,
    Mixing,
    Serialization,
    Api,
    Unknown,
}

impl VelaError {
    /// Create an API error from a status code and body.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Network(_) | Self::Io(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::ValidationRejected(_) => ErrorCategory::Validation,
            Self::GenerationUnavailable { .. } => ErrorCategory::Generation,
            Self::ClassificationAmbiguous(_) => ErrorCategory::Classification,
            Self::MixingUnavailable(_) => ErrorCategory::Mixing,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            _ => ErrorCategory::Unknown,
        }
    }

    /// Whether this error is potentially retryable.
    ///
    /// Only transient transport conditions qualify; validation rejections
    /// and classification failures are terminal for the attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Timeout | ErrorCategory::Server
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, VelaError>;
