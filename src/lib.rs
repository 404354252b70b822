//! Vela — personalized meditation audio generation.
//!
//! Turns a user's profile and ritual preferences into a finished, mixed
//! audio meditation: a narrative provider writes the script, pacing
//! markers slow the delivery, a TTS provider voices it, and a
//! deterministic mixing chain lays it over music. An orchestrated
//! exchange with an external generation service provides an alternate
//! path that always yields a playable asset, falling back to a
//! placeholder when the service misbehaves.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use vela::prelude::*;
//!
//! # async fn example() -> vela::error::Result<()> {
//! let config = VelaConfig::from_env();
//! let mixer = AudioMixer::from_file("music.mp3")?;
//! let persister = Arc::new(FilesystemPersister::new("media"));
//! let pipeline = MeditationPipeline::from_config(&config, mixer, persister)?;
//!
//! let request = GenerationRequest {
//!     user: Some(UserRef("user-42".into())),
//!     kind: RitualKind::Sleep,
//!     profile: Profile { name: "Aria".into(), ..Default::default() },
//!     params: RitualParams::default(),
//! };
//! let outcome = pipeline.generate_local(&request).await?;
//! println!("{}", outcome.asset.url);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod mixer;
pub mod orchestrator;
pub mod persist;
pub mod pipeline;
pub mod prelude;
pub mod script;
pub mod synthesis;
pub mod types;
pub mod util;
