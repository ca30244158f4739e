//! QR code image generation.
//!
//! Resolves caller options into clamped [`RenderOptions`], renders the
//! symbol with [`QrEncoder`] and returns PNG bytes plus a data URL.

pub mod color;
pub mod error;
pub mod options;
pub mod qr;

pub use color::{Color, ColorParseError};
pub use error::EncodeError;
pub use options::{ErrorCorrection, Palette, RenderOptions, RenderRequest, parse_dimension};
pub use qr::{EncodedImage, Encoder, PNG_DATA_URL_PREFIX, QrEncoder};
