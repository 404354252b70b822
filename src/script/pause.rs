//! Pacing-marker insertion.
//!
//! Spoken delivery of the generated script is slowed by inserting a
//! ` --- ` cue between sentences; the synthesis voice renders the dashes
//! as a beat of silence. The final sentence is left unmarked so the
//! recording does not trail off into a pause.

use std::sync::OnceLock;

use regex::Regex;

/// The cue inserted between sentences.
pub const PAUSE_MARKER: &str = " --- ";

/// A sentence boundary: a period followed by one whitespace character.
fn boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.\s").expect("valid boundary regex"))
}

/// Insert a pacing marker after each internal sentence boundary, except
/// the boundary immediately preceding the final sentence when the text
/// ends with a period.
///
/// Pure transform: single-sentence input and input without
/// sentence-terminating periods are returned unchanged.
pub fn annotate_pauses(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 32);
    let mut last = 0;

    for m in boundary_re().find_iter(text) {
        let rest = &text[m.end()..];
        if is_final_sentence(rest) {
            continue;
        }
        // Keep the period, replace the whitespace with the marker.
        out.push_str(&text[last..m.start() + 1]);
        out.push_str(PAUSE_MARKER);
        last = m.end();
    }

    out.push_str(&text[last..]);
    out
}

/// True when `rest` is exactly one closing sentence: it ends with a
/// period and contains no earlier period.
fn is_final_sentence(rest: &str) -> bool {
    rest.ends_with('.') && !rest[..rest.len() - 1].contains('.')
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn single_sentence_unchanged() {
        assert_eq!(annotate_pauses("Good night, Aria."), "Good night, Aria.");
    }

    #[test]
    fn no_periods_unchanged() {
        assert_eq!(annotate_pauses("soft and heavy"), "soft and heavy");
    }

    #[test]
    fn marker_after_each_internal_boundary_except_last() {
        let input = "Close your eyes. Breathe in. Sleep well, Aria.";
        let expected = "Close your eyes. --- Breathe in. Sleep well, Aria.";
        assert_eq!(annotate_pauses(input), expected);
    }

    #[test]
    fn two_sentences_get_no_marker() {
        // One internal boundary, and it precedes the final sentence.
        let input = "Close your eyes. Sleep well.";
        assert_eq!(annotate_pauses(input), input);
    }

    #[test]
    fn marker_count_is_boundaries_minus_one_for_period_terminated_text() {
        let input = "One. Two. Three. Four. Five.";
        let annotated = annotate_pauses(input);
        let markers = annotated.matches(PAUSE_MARKER).count();
        // Four internal boundaries, the last one unmarked.
        assert_eq!(markers, 3);
        assert!(annotated.ends_with(" Five."));
        assert!(!annotated.contains("--- Five."));
    }

    #[test]
    fn text_without_trailing_period_marks_every_boundary() {
        let input = "One. Two. and so it goes";
        assert_eq!(annotate_pauses(input), "One. --- Two. --- and so it goes");
    }

    #[test]
    fn mid_word_periods_are_not_boundaries() {
        let input = "Version 2.5 is calm. Water flows gently. Rest now.";
        assert_eq!(
            annotate_pauses(input),
            "Version 2.5 is calm. --- Water flows gently. Rest now."
        );
    }
}
