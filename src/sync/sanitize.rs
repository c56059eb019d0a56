//! Path segment sanitization for term labels and course names.

/// Strips every non-alphanumeric character from a label.
///
/// Case, digits and non-ASCII letters survive. Two labels that differ only in
/// punctuation or spacing map to the same segment and share a directory.
///
/// ```
/// use moodle_sync_core::sync::sanitize_segment;
///
/// assert_eq!(sanitize_segment("Intro to CS (WS 23/24)"), "IntrotoCSWS2324");
/// ```
#[must_use]
pub fn sanitize_segment(label: &str) -> String {
    label.chars().filter(|c| c.is_alphanumeric()).collect()
}
