//! Candidate request-body shapes for the external generation service.
//!
//! The service's contract was never formally published, so the
//! orchestrator tries a fixed priority order of field-naming and casing
//! conventions until one is accepted. The canonical shape is the one
//! the service is known to accept today.

use serde_json::json;

use crate::types::GenerationRequest;

/// Default check-in text when the caller supplied none. The service's
/// schema marks the field required, so a literal placeholder is sent.
const DEFAULT_CHECK_IN: &str = "string";

/// One candidate payload convention, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// snake_case fields, display-cased enum values, integer length.
    Canonical,
    /// camelCase fields, display-cased enum values.
    CamelCase,
    /// snake_case fields, lowercase enum values.
    Lowercase,
}

impl PayloadShape {
    /// All shapes in the order they are attempted.
    pub fn candidates() -> [PayloadShape; 3] {
        [Self::Canonical, Self::CamelCase, Self::Lowercase]
    }

    /// Build the JSON body for this shape from a generation request.
    pub fn build(&self, request: &GenerationRequest) -> serde_json::Value {
        let profile = &request.profile;
        let params = &request.params;
        let check_in = params.check_in.as_deref().unwrap_or(DEFAULT_CHECK_IN);
        let length = params.duration.minutes();

        match self {
            Self::Canonical => json!({
                "name": profile.name,
                "goals": profile.goals,
                "dreamlife": profile.dream_life,
                "dream_activities": profile.activities,
                "ritual_type": params.mode.external_name(),
                "tone": params.tone.external_name(),
                "voice": params.voice.external_name(),
                "length": length,
                "check_in": check_in,
            }),
            Self::CamelCase => json!({
                "name": profile.name,
                "goals": profile.goals,
                "dreamLife": profile.dream_life,
                "dreamActivities": profile.activities,
                "ritualType": params.mode.external_name(),
                "tone": params.tone.external_name(),
                "voice": params.voice.external_name(),
                "length": length,
                "checkIn": check_in,
            }),
            Self::Lowercase => json!({
                "name": profile.name,
                "goals": profile.goals,
                "dreamlife": profile.dream_life,
                "dream_activities": profile.activities,
                "ritual_type": params.mode.external_name().to_ascii_lowercase(),
                "tone": params.tone.external_name().to_ascii_lowercase(),
                "voice": params.voice.external_name().to_ascii_lowercase(),
                "length": length,
                "check_in": check_in,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        DurationMinutes, Profile, RitualKind, RitualMode, RitualParams, Tone, Voice,
    };

    fn request() -> GenerationRequest {
        GenerationRequest {
            user: None,
            kind: RitualKind::Spark,
            profile: Profile {
                name: "Boris".into(),
                goals: "Enjoy life to the fullest".into(),
                dream_life: "A hammock in nature".into(),
                activities: "Adventure and creation".into(),
                age_range: Some("25".into()),
                gender: None,
            },
            params: RitualParams {
                mode: RitualMode::Story,
                tone: Tone::Dreamy,
                voice: Voice::Female,
                duration: DurationMinutes::Two,
                check_in: None,
            },
        }
    }

    #[test]
    fn canonical_shape_matches_the_known_contract() {
        let body = PayloadShape::Canonical.build(&request());
        assert_eq!(body["name"], "Boris");
        assert_eq!(body["dreamlife"], "A hammock in nature");
        assert_eq!(body["dream_activities"], "Adventure and creation");
        assert_eq!(body["ritual_type"], "Story");
        assert_eq!(body["tone"], "Dreamy");
        assert_eq!(body["voice"], "Female");
        assert_eq!(body["length"], 2);
        assert_eq!(body["check_in"], "string");
    }

    #[test]
    fn camel_case_shape_renames_fields() {
        let body = PayloadShape::CamelCase.build(&request());
        assert_eq!(body["dreamLife"], "A hammock in nature");
        assert_eq!(body["ritualType"], "Story");
        assert!(body.get("dreamlife").is_none());
    }

    #[test]
    fn lowercase_shape_folds_enum_values() {
        let mut req = request();
        req.params.tone = Tone::Asmr;
        let body = PayloadShape::Lowercase.build(&req);
        assert_eq!(body["tone"], "asmr");
        assert_eq!(body["ritual_type"], "story");
        assert_eq!(body["voice"], "female");
    }

    #[test]
    fn caller_check_in_overrides_the_placeholder() {
        let mut req = request();
        req.params.check_in = Some("Feeling hopeful".into());
        let body = PayloadShape::Canonical.build(&req);
        assert_eq!(body["check_in"], "Feeling hopeful");
    }

    #[test]
    fn candidates_are_tried_canonical_first() {
        assert_eq!(PayloadShape::candidates()[0], PayloadShape::Canonical);
    }
}
