//! Raw input cleaning: markup, control characters, surrounding whitespace.

use crate::markup::strip_markup;

/// Clean raw input for encoding.
///
/// Removes control characters other than tab, LF and CR, strips markup and
/// trims surrounding whitespace. The result is a fixed point:
/// `sanitize(&sanitize(x)) == sanitize(x)`.
pub fn sanitize(raw: &str) -> String {
    // Controls go first so that removing one can never complete a tag.
    let filtered: String = raw.chars().filter(|&c| !is_disallowed_control(c)).collect();
    strip_markup(&filtered).trim().to_string()
}

/// C0 controls and DEL, except tab, LF and CR.
pub fn is_disallowed_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
}

/// C0 controls, DEL and C1 controls.
pub fn is_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{1F}' | '\u{7F}'..='\u{9F}')
}

/// Number of characters in `text` counted as control characters.
pub fn count_controls(text: &str) -> usize {
    text.chars().filter(|&c| is_control(c)).count()
}
