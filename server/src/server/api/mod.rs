//! REST API handlers.

pub mod qr;
pub mod settings;

use axum::Json;
use axum::http::StatusCode;
use serde_json::{json, Value};

pub type ApiError = (StatusCode, Json<Value>);
pub type ApiResult = Result<Json<Value>, ApiError>;

/// Standard error response: `{"success":false,"error":<code>,"message":<text>}`.
pub fn err_json(status: StatusCode, code: &str, message: &str) -> ApiError {
    (
        status,
        Json(json!({ "success": false, "error": code, "message": message })),
    )
}
