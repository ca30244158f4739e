//! Validation outcomes and their user-facing wording.

use serde::Serialize;

/// How an outcome affects generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Silent, generation proceeds.
    Accept,
    /// Advisory, generation still proceeds.
    Warn,
    /// Blocking, generation is suppressed and any previous image cleared.
    Reject,
}

/// Non-blocking advisories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    InvalidCharacters,
    TooManyControlCharacters,
    LongText,
    RateLimited,
}

/// Blocking failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    TooLong,
    UnsafeContent,
    GenerationFailed,
}

impl Warning {
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidCharacters => "invalid_characters",
            Self::TooManyControlCharacters => "too_many_control_characters",
            Self::LongText => "long_text",
            Self::RateLimited => "rate_limited",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::InvalidCharacters => {
                "Input contained invalid characters that were removed. Please use plain text only."
            }
            Self::TooManyControlCharacters => "Input contains too many control characters.",
            Self::LongText => "Long text may result in complex QR codes that are harder to scan.",
            Self::RateLimited => {
                "Rate limit exceeded. Please wait before generating more QR codes."
            }
        }
    }
}

impl Rejection {
    pub fn code(self) -> &'static str {
        match self {
            Self::TooLong => "too_long",
            Self::UnsafeContent => "unsafe_content",
            Self::GenerationFailed => "generation_failed",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::TooLong => "Text is too long. Maximum 2953 characters allowed for QR codes.",
            Self::UnsafeContent => {
                "Input contains potentially unsafe content. Please use plain text only."
            }
            Self::GenerationFailed => "Failed to generate QR code. Please try with different text.",
        }
    }
}

/// Result of validating one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accept,
    Warn(Warning),
    Reject(Rejection),
}

impl Outcome {
    pub fn severity(self) -> Severity {
        match self {
            Self::Accept => Severity::Accept,
            Self::Warn(_) => Severity::Warn,
            Self::Reject(_) => Severity::Reject,
        }
    }

    /// `true` unless the outcome blocks generation.
    pub fn allows_generation(self) -> bool {
        !matches!(self, Self::Reject(_))
    }

    pub fn code(self) -> Option<&'static str> {
        match self {
            Self::Accept => None,
            Self::Warn(w) => Some(w.code()),
            Self::Reject(r) => Some(r.code()),
        }
    }

    pub fn message(self) -> Option<&'static str> {
        match self {
            Self::Accept => None,
            Self::Warn(w) => Some(w.message()),
            Self::Reject(r) => Some(r.message()),
        }
    }

    /// Serializable form for API and WebSocket payloads. `None` for `Accept`.
    pub fn notice(self) -> Option<Notice> {
        Some(Notice {
            severity: self.severity(),
            code: self.code()?,
            message: self.message()?,
        })
    }
}

/// Wire form of a warning or rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub code: &'static str,
    pub message: &'static str,
}
