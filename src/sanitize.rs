//! Cleans user-typed identifiers before they are spliced into a URL.

use once_cell::sync::Lazy;
use regex::Regex;

static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\-./]").unwrap());

/// Keeps ASCII word characters, `-`, `.` and `/`, then trims.
///
/// An empty result means the field is missing.
pub fn normalize_input(value: &str) -> String {
    DISALLOWED.replace_all(value, "").trim().to_string()
}
