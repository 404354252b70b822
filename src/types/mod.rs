//! Domain types for meditation generation.
//!
//! Every user-facing selector (ritual kind, mode, tone, voice, duration)
//! has a total, case-insensitive normalization: unrecognized input maps
//! to a documented default instead of failing. The external generation
//! service expects display-cased forms ("Story", "Dreamy", ...); the
//! `external_name` accessors produce those.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// High-level meditation category. Selects the remote endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum RitualKind {
    Sleep,
    Spark,
    Calm,
    Dream,
}

impl RitualKind {
    /// Human-readable name as shown in the product catalog.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Sleep => "Sleep Manifestation",
            Self::Spark => "Morning Spark",
            Self::Calm => "Calming Reset",
            Self::Dream => "Dream Visualizer",
        }
    }

    /// Slug used in asset file names.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Sleep => "sleep_manifestation",
            Self::Spark => "morning_spark",
            Self::Calm => "calming_reset",
            Self::Dream => "dream_visualizer",
        }
    }

    /// Parse a catalog name or slug; `None` when the kind is unknown.
    pub fn from_name(name: &str) -> Option<Self> {
        let folded = name.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match folded.as_str() {
            "sleep" | "sleep_manifestation" => Some(Self::Sleep),
            "spark" | "morning_spark" => Some(Self::Spark),
            "calm" | "calming_reset" => Some(Self::Calm),
            "dream" | "dream_visualizer" => Some(Self::Dream),
            _ => None,
        }
    }
}

/// Narrative-or-guided delivery mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RitualMode {
    #[default]
    Story,
    Guided,
}

impl RitualMode {
    /// Normalize free-form input; unknown values become `Story`.
    pub fn normalize(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "guided" | "guided_meditations" => Self::Guided,
            _ => Self::Story,
        }
    }

    /// Display-cased form expected by the external service.
    pub fn external_name(&self) -> &'static str {
        match self {
            Self::Story => "Story",
            Self::Guided => "Guided",
        }
    }
}

/// Audio tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Dreamy,
    Asmr,
}

impl Tone {
    /// Normalize free-form input; unknown values become `Dreamy`.
    pub fn normalize(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "asmr" => Self::Asmr,
            _ => Self::Dreamy,
        }
    }

    pub fn external_name(&self) -> &'static str {
        match self {
            Self::Dreamy => "Dreamy",
            Self::Asmr => "ASMR",
        }
    }
}

/// Narration voice. Each maps to a fixed ElevenLabs voice id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Voice {
    #[default]
    Female,
    Male,
}

impl Voice {
    /// Normalize free-form input; unknown values become `Female`.
    pub fn normalize(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "male" => Self::Male,
            _ => Self::Female,
        }
    }

    pub fn external_name(&self) -> &'static str {
        match self {
            Self::Female => "Female",
            Self::Male => "Male",
        }
    }
}

/// Meditation length. Only three lengths are produced; anything else
/// normalizes to the shortest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DurationMinutes {
    #[default]
    Two,
    Five,
    Ten,
}

impl DurationMinutes {
    /// Normalize an arbitrary minute count to a supported duration.
    pub fn from_minutes(minutes: i64) -> Self {
        match minutes {
            5 => Self::Five,
            10 => Self::Ten,
            _ => Self::Two,
        }
    }

    pub fn minutes(&self) -> u32 {
        match self {
            Self::Two => 2,
            Self::Five => 5,
            Self::Ten => 10,
        }
    }

    /// Target script word count for this duration.
    ///
    /// Calibrated against a ~114 words/minute delivery rate after pacing
    /// markers are inserted.
    pub fn target_word_count(&self) -> &'static str {
        match self {
            Self::Two => "250",
            Self::Five => "600",
            Self::Ten => "1200",
        }
    }
}

/// Free-text profile fields feeding the script prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    /// First name only; the prompt forbids last names.
    pub name: String,
    pub goals: String,
    pub dream_life: String,
    /// "They are the happiest when ..." free text.
    pub activities: String,
    pub age_range: Option<String>,
    pub gender: Option<String>,
}

/// Per-ritual parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RitualParams {
    pub mode: RitualMode,
    pub tone: Tone,
    pub voice: Voice,
    pub duration: DurationMinutes,
    pub check_in: Option<String>,
}

/// Opaque reference to the requesting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef(pub String);

/// One immutable generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub user: Option<UserRef>,
    pub kind: RitualKind,
    pub profile: Profile,
    pub params: RitualParams,
}

/// How the delivered asset was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Freshly generated content.
    Generated,
    /// The fixed placeholder was substituted after generation failed.
    Placeholder,
}

/// Result of a full pipeline run: a durable asset reference plus a
/// marker distinguishing real content from the placeholder fallback.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub asset: crate::persist::AssetReference,
    pub delivery: Delivery,
}

impl GenerationOutcome {
    pub fn is_degraded(&self) -> bool {
        self.delivery == Delivery::Placeholder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_mapping_is_total() {
        assert_eq!(DurationMinutes::from_minutes(2).target_word_count(), "250");
        assert_eq!(DurationMinutes::from_minutes(5).target_word_count(), "600");
        assert_eq!(DurationMinutes::from_minutes(10).target_word_count(), "1200");
        // Unknown values resolve to the shortest duration.
        assert_eq!(DurationMinutes::from_minutes(0).target_word_count(), "250");
        assert_eq!(DurationMinutes::from_minutes(15).target_word_count(), "250");
        assert_eq!(DurationMinutes::from_minutes(-3).target_word_count(), "250");
    }

    #[test]
    fn enum_normalization_is_case_insensitive_and_total() {
        assert_eq!(Voice::normalize("MALE"), Voice::Male);
        assert_eq!(Voice::normalize("Female"), Voice::Female);
        assert_eq!(Voice::normalize("robot"), Voice::Female);
        assert_eq!(Tone::normalize("AsMr"), Tone::Asmr);
        assert_eq!(Tone::normalize("loud"), Tone::Dreamy);
        assert_eq!(RitualMode::normalize("guided_meditations"), RitualMode::Guided);
        assert_eq!(RitualMode::normalize("poem"), RitualMode::Story);
    }

    #[test]
    fn ritual_kind_from_name_accepts_slugs_and_display_names() {
        assert_eq!(RitualKind::from_name("Sleep Manifestation"), Some(RitualKind::Sleep));
        assert_eq!(RitualKind::from_name("morning_spark"), Some(RitualKind::Spark));
        assert_eq!(RitualKind::from_name("CALM"), Some(RitualKind::Calm));
        assert_eq!(RitualKind::from_name("breathing"), None);
    }

    #[test]
    fn ritual_kind_parses_case_insensitively() {
        assert_eq!("SLEEP".parse::<RitualKind>().unwrap(), RitualKind::Sleep);
        assert_eq!("dream".parse::<RitualKind>().unwrap(), RitualKind::Dream);
    }
}
