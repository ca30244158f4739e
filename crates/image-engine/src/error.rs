//! Encoder error type.

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("QR encode error: {0}")]
    Qr(String),
    #[error("PNG encode error: {0}")]
    Png(#[from] image::ImageError),
    #[error("unexpected image format")]
    BadSignature,
}
