//! QR code rendering to PNG data URLs.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, Rgba, RgbaImage};
use qrcode::QrCode;
use tracing::debug;

use crate::error::EncodeError;
use crate::options::RenderOptions;

/// Prefix every PNG data URL produced by the encoder starts with.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// A rendered QR code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub png: Vec<u8>,
    pub data_url: String,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    /// Wrap PNG bytes, building the data URL.
    pub fn from_png(png: Vec<u8>, width: u32, height: u32) -> Self {
        let data_url = format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(&png));
        Self {
            png,
            data_url,
            width,
            height,
        }
    }

    /// `true` when the data URL carries the expected PNG signature.
    pub fn has_png_signature(&self) -> bool {
        self.data_url.starts_with(PNG_DATA_URL_PREFIX) && self.png.starts_with(PNG_MAGIC)
    }
}

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Black-box text-to-image encoder.
pub trait Encoder: Send + Sync {
    fn encode(&self, text: &str, options: &RenderOptions) -> Result<EncodedImage, EncodeError>;
}

/// [`Encoder`] backed by the `qrcode` and `image` crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrEncoder;

impl Encoder for QrEncoder {
    fn encode(&self, text: &str, options: &RenderOptions) -> Result<EncodedImage, EncodeError> {
        let img = render_qr(text, options)?;
        let (width, height) = img.dimensions();

        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        debug!(width, bytes = png.len(), "Encoded QR PNG");
        Ok(EncodedImage::from_png(png, width, height))
    }
}

/// Render `data` into a square RGBA image `options.width` pixels wide.
///
/// Modules are scaled by the largest integer factor that fits, with a quiet
/// zone of `options.margin` modules, and centered on a light canvas. When the
/// symbol has more modules than pixels available it is drawn one pixel per
/// module instead.
pub fn render_qr(data: &str, options: &RenderOptions) -> Result<RgbaImage, EncodeError> {
    let level = options.error_correction.ec_level();
    let code = QrCode::with_error_correction_level(data.as_bytes(), level)
        .map_err(|e| EncodeError::Qr(e.to_string()))?;
    let modules = code.to_colors();
    let module_count = code.width() as u32;
    let margin = options.margin;
    let total_modules = module_count + 2 * margin;

    let scale = (options.width / total_modules).max(1);
    let symbol_size = total_modules * scale;
    let canvas_size = symbol_size.max(options.width);
    let offset = (canvas_size - symbol_size) / 2;

    let dark = Rgba(options.color.dark.to_rgba());
    let light = Rgba(options.color.light.to_rgba());
    let mut img = RgbaImage::from_pixel(canvas_size, canvas_size, light);

    for (i, color) in modules.iter().enumerate() {
        if *color != qrcode::Color::Dark {
            continue;
        }
        let x = (i as u32) % module_count;
        let y = (i as u32) / module_count;
        let px = offset + (margin + x) * scale;
        let py = offset + (margin + y) * scale;
        for dy in 0..scale {
            for dx in 0..scale {
                img.put_pixel(px + dx, py + dy, dark);
            }
        }
    }

    debug!(
        module_count,
        scale,
        canvas_size,
        level = options.error_correction.as_str(),
        "Rendered QR modules"
    );
    Ok(img)
}
