//! Accept / warn / reject classification of raw input.

use crate::outcome::{Outcome, Rejection, Warning};
use crate::patterns::find_dangerous;
use crate::sanitize::{count_controls, sanitize};
use crate::{LONG_TEXT_CHARS, MAX_CONTROL_CHARS, MAX_RAW_INPUT_BYTES, MAX_TEXT_CHARS};

/// Sanitized text together with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub sanitized: String,
    pub outcome: Outcome,
}

impl Validation {
    /// `true` when there is non-empty text and nothing blocks it.
    pub fn is_renderable(&self) -> bool {
        !self.sanitized.is_empty() && self.outcome.allows_generation()
    }
}

/// Sanitize `raw` and classify the result.
///
/// The first terminal condition wins. A stripped-content warning does not
/// stop the length and pattern checks; if neither rejects, it is the one
/// warning surfaced. Input over [`MAX_RAW_INPUT_BYTES`] is rejected as too
/// long before any sanitizing.
pub fn validate(raw: &str) -> Validation {
    if raw.len() > MAX_RAW_INPUT_BYTES {
        tracing::debug!(raw_len = raw.len(), "Input over raw size limit");
        return Validation {
            sanitized: String::new(),
            outcome: Outcome::Reject(Rejection::TooLong),
        };
    }

    let sanitized = sanitize(raw);
    let outcome = classify(raw, &sanitized);
    if outcome != Outcome::Accept {
        tracing::debug!(
            raw_len = raw.len(),
            sanitized_len = sanitized.len(),
            code = outcome.code().unwrap_or_default(),
            "Input flagged"
        );
    }
    Validation { sanitized, outcome }
}

fn classify(raw: &str, sanitized: &str) -> Outcome {
    if sanitized.is_empty() {
        // Whitespace-only input is simply nothing to render.
        if raw.trim().is_empty() {
            return Outcome::Accept;
        }
        return Outcome::Warn(Warning::InvalidCharacters);
    }

    let len = sanitized.chars().count();
    let stripped = len != raw.chars().count();

    if len > MAX_TEXT_CHARS {
        return Outcome::Reject(Rejection::TooLong);
    }
    if let Some(pattern) = find_dangerous(sanitized) {
        tracing::debug!(pattern, "Dangerous pattern matched");
        return Outcome::Reject(Rejection::UnsafeContent);
    }
    if stripped {
        return Outcome::Warn(Warning::InvalidCharacters);
    }
    if count_controls(sanitized) > MAX_CONTROL_CHARS {
        return Outcome::Warn(Warning::TooManyControlCharacters);
    }
    if len > LONG_TEXT_CHARS {
        return Outcome::Warn(Warning::LongText);
    }
    Outcome::Accept
}
