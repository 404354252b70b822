//! Asset persistence boundary.
//!
//! The pipeline hands a finished byte buffer (or the placeholder) to an
//! [`AssetPersister`] and receives a durable, addressable reference.
//! Storage problems never fail the overall request; `store` always
//! returns a reference usable for later retry or inspection.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::Result;
use crate::mixer::{AssetFormat, AudioBuffer};
use crate::types::{RitualKind, RitualParams};

/// Stable reference to a stored asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetReference {
    pub id: String,
    /// URL-like locator for the stored bytes.
    pub url: String,
}

/// Descriptive metadata attached to every stored record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub ritual: String,
    pub mode: String,
    pub tone: String,
    pub voice: String,
    pub duration_minutes: u32,
}

impl AssetMetadata {
    pub fn from_request(kind: RitualKind, params: &RitualParams) -> Self {
        Self {
            ritual: kind.display_name().to_string(),
            mode: params.mode.external_name().to_string(),
            tone: params.tone.external_name().to_string(),
            voice: params.voice.external_name().to_string(),
            duration_minutes: params.duration.minutes(),
        }
    }
}

/// Deterministic asset file name from the ritual kind and a timestamp.
pub fn asset_file_name(kind: RitualKind, format: AssetFormat) -> String {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    format!(
        "meditation_{}_{timestamp}.{}",
        kind.slug(),
        format.extension()
    )
}

/// Durable storage for finished assets.
#[async_trait]
pub trait AssetPersister: Send + Sync {
    /// Store a byte buffer under a suggested name and return its
    /// reference. Must not fail the overall request; on storage error
    /// the returned reference still identifies the attempted record.
    async fn store(
        &self,
        bytes: &[u8],
        suggested_name: &str,
        metadata: &AssetMetadata,
    ) -> AssetReference;

    /// Look up an existing asset by identifier.
    async fn reference(&self, id: &str) -> Option<AssetReference>;
}

/// The fixed, always-available audio substituted when generation fails.
#[derive(Debug, Clone)]
pub struct PlaceholderAsset {
    bytes: Arc<Vec<u8>>,
}

impl PlaceholderAsset {
    /// Load the placeholder track from disk (the bundled default mp3 in
    /// production).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self {
            bytes: Arc::new(bytes),
        })
    }

    /// A generated two-second silent WAV. Used when no placeholder
    /// track is configured, so the fallback guarantee holds even with
    /// no files on disk.
    pub fn silent() -> Self {
        let bytes = AudioBuffer::silence(2_000, 44_100, 1)
            .to_wav_bytes()
            .unwrap_or_else(|_| b"RIFF".to_vec());
        Self {
            bytes: Arc::new(bytes),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> AssetFormat {
        if self.bytes.starts_with(b"RIFF") {
            AssetFormat::Wav
        } else {
            AssetFormat::Mp3
        }
    }
}

impl Default for PlaceholderAsset {
    fn default() -> Self {
        Self::silent()
    }
}

/// Filesystem-backed persister: bytes beside a JSON metadata sidecar.
#[derive(Debug, Clone)]
pub struct FilesystemPersister {
    root: PathBuf,
    public_base: Option<String>,
}

impl FilesystemPersister {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            public_base: None,
        }
    }

    /// Serve stored assets under this URL prefix instead of file paths.
    pub fn with_public_base(mut self, base: impl Into<String>) -> Self {
        self.public_base = Some(base.into());
        self
    }

    fn url_for(&self, name: &str) -> String {
        match &self.public_base {
            Some(base) => format!("{}/{name}", base.trim_end_matches('/')),
            None => self.root.join(name).to_string_lossy().into_owned(),
        }
    }
}

#[async_trait]
impl AssetPersister for FilesystemPersister {
    async fn store(
        &self,
        bytes: &[u8],
        suggested_name: &str,
        metadata: &AssetMetadata,
    ) -> AssetReference {
        let id = suggested_name
            .rsplit_once('.')
            .map(|(stem, _)| stem.to_string())
            .unwrap_or_else(|| suggested_name.to_string());
        let reference = AssetReference {
            id: id.clone(),
            url: self.url_for(suggested_name),
        };

        let write = async {
            tokio::fs::create_dir_all(&self.root).await?;
            tokio::fs::write(self.root.join(suggested_name), bytes).await?;
            let sidecar = serde_json::to_vec_pretty(metadata)?;
            tokio::fs::write(self.root.join(format!("{id}.json")), sidecar).await?;
            Ok::<_, crate::error::VelaError>(())
        };

        match write.await {
            Ok(()) => {
                info!(id = %reference.id, bytes = bytes.len(), "Stored asset");
            }
            Err(e) => {
                // The reference is still returned so the caller can
                // retry or inspect the failed record.
                error!(id = %reference.id, error = %e, "Failed to store asset");
            }
        }

        reference
    }

    async fn reference(&self, id: &str) -> Option<AssetReference> {
        for ext in ["mp3", "wav"] {
            let name = format!("{id}.{ext}");
            if tokio::fs::try_exists(self.root.join(&name))
                .await
                .unwrap_or(false)
            {
                return Some(AssetReference {
                    id: id.to_string(),
                    url: self.url_for(&name),
                });
            }
        }
        None
    }
}
