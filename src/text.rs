//! Text comparison helpers
//!
//! Authored requirements and model data frequently differ only by letter
//! case or by accents ("à rénover" vs "A RENOVER"). Folding removes both:
//! the text is decomposed (NFD), combining marks are dropped and the
//! remainder is lowercased.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold a string for accent and case insensitive comparison
pub fn fold(s: &str) -> String {
    strip_accents(s).chars().flat_map(char::to_lowercase).collect()
}

/// Remove accents and keep letter case
///
/// Used on regular expressions, where lowercasing would turn escapes such
/// as `\D` into `\d`.
pub fn strip_accents(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Case-insensitive equality without accent folding
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Accent and case insensitive equality
pub fn eq_folded(a: &str, b: &str) -> bool {
    fold(a) == fold(b)
}
