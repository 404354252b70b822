//! Binary-vs-structured response classification.
//!
//! The external service answers 200 with either raw audio (sometimes
//! without an audio content-type) or a JSON document. Classification is
//! a pure function of the bytes and the declared content-type, performed
//! before any text decoding; a failed JSON parse is never the signal.

/// Window inspected for byte-pattern heuristics.
const INSPECTION_WINDOW: usize = 256;

/// Proportion of non-ASCII bytes in the window above which a body is
/// considered binary.
const NON_ASCII_THRESHOLD: f32 = 0.30;

/// Bodies larger than this are assumed to be audio; error documents and
/// acknowledgements are never this big.
const SIZE_THRESHOLD: usize = 100 * 1024;

/// Outcome of classifying a 200 response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// The body is raw audio.
    BinaryAudio,
    /// The body parsed as JSON.
    Structured(serde_json::Value),
    /// Neither recognizably binary nor valid JSON. Reported as an
    /// explicit error, never guessed.
    Ambiguous,
}

/// Classify a response body given its declared content-type.
pub fn classify(content_type: Option<&str>, body: &[u8]) -> Classification {
    if let Some(ct) = content_type {
        if ct.to_ascii_lowercase().contains("audio") {
            return Classification::BinaryAudio;
        }
    }

    if has_audio_signature(body) {
        return Classification::BinaryAudio;
    }

    let window = &body[..body.len().min(INSPECTION_WINDOW)];
    if window.contains(&0) || non_ascii_ratio(window) > NON_ASCII_THRESHOLD {
        return Classification::BinaryAudio;
    }

    if body.len() > SIZE_THRESHOLD {
        return Classification::BinaryAudio;
    }

    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) => Classification::Structured(value),
        // A body that will not parse but still carries stray high bytes
        // is a truncated or unlabeled binary, not a protocol error.
        Err(_) if window.iter().any(|b| !b.is_ascii()) => Classification::BinaryAudio,
        Err(_) => Classification::Ambiguous,
    }
}

/// Well-known audio container signatures at the start of the body.
fn has_audio_signature(body: &[u8]) -> bool {
    if body.starts_with(b"ID3") || body.starts_with(b"RIFF") {
        return true;
    }
    if body.starts_with(b"OggS") || body.starts_with(b"fLaC") {
        return true;
    }
    // Bare MPEG frame sync: 11 set bits across the first two bytes.
    matches!(body, [0xFF, b, ..] if b & 0xE0 == 0xE0)
}

fn non_ascii_ratio(window: &[u8]) -> f32 {
    if window.is_empty() {
        return 0.0;
    }
    let non_ascii = window.iter().filter(|b| !b.is_ascii()).count();
    non_ascii as f32 / window.len() as f32
}
