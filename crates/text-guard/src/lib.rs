//! Input sanitization and validation for text headed into a QR encoder.
//!
//! [`sanitize`] strips markup and disallowed control characters;
//! [`validate`] classifies the result as accept, warn or reject.

pub mod markup;
pub mod outcome;
pub mod patterns;
pub mod sanitize;
pub mod validate;

pub use outcome::{Notice, Outcome, Rejection, Severity, Warning};
pub use sanitize::sanitize;
pub use validate::{Validation, validate};

/// Raw input above this many bytes is rejected without being parsed.
pub const MAX_RAW_INPUT_BYTES: usize = 64 * 1024;

/// Maximum byte capacity of a QR symbol at its lowest density.
pub const MAX_TEXT_CHARS: usize = 2953;

/// Above this length the text still encodes but warns about scannability.
pub const LONG_TEXT_CHARS: usize = 1000;

/// Control characters tolerated before warning.
pub const MAX_CONTROL_CHARS: usize = 10;
