//! QR generation over HTTP:
//!   GET /api/qr           – JSON with a PNG data URL
//!   GET /api/qr/download  – the PNG as an attachment

use axum::Json;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use image_engine::{RenderRequest, parse_dimension};
use serde::Deserialize;
use serde_json::json;
use text_guard::{Outcome, Rejection};

use crate::app::SharedState;
use crate::services::download;
use crate::services::gate::GateReason;
use crate::services::pipeline::{self, Generation};

use super::{err_json, ApiError, ApiResult};

/// Raw query parameters. Values are parsed by hand so a bad one yields a
/// JSON 400 instead of axum's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub struct QrQuery {
    pub text: Option<String>,
    pub width: Option<String>,
    pub margin: Option<String>,
    pub error: Option<String>,
    pub fg: Option<String>,
    pub foreground: Option<String>,
    pub bg: Option<String>,
    pub background: Option<String>,
}

impl QrQuery {
    /// Build a render request. `fg`/`bg` win over their long aliases.
    pub fn render_request(&self) -> Result<RenderRequest, ApiError> {
        let fg = self.fg.as_deref().or(self.foreground.as_deref());
        let bg = self.bg.as_deref().or(self.background.as_deref());
        Ok(RenderRequest {
            error_correction: parse_param("error", self.error.as_deref(), |v| v.parse().ok())?,
            width: parse_param("width", self.width.as_deref(), parse_dimension)?,
            margin: parse_param("margin", self.margin.as_deref(), parse_dimension)?,
            dark: parse_param("fg", fg, |v| v.parse().ok())?,
            light: parse_param("bg", bg, |v| v.parse().ok())?,
        })
    }
}

fn parse_param<T>(
    name: &str,
    raw: Option<&str>,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<Option<T>, ApiError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => parse(value).map(Some).ok_or_else(|| {
            err_json(
                StatusCode::BAD_REQUEST,
                "invalid_parameter",
                &format!("Invalid value for parameter '{name}'"),
            )
        }),
    }
}

fn missing_text() -> ApiError {
    err_json(
        StatusCode::BAD_REQUEST,
        "missing_text",
        "Missing required parameter: text",
    )
}

/// Text was given but sanitization left nothing to encode.
fn empty_after_sanitize(outcome: Outcome) -> ApiError {
    err_json(
        StatusCode::UNPROCESSABLE_ENTITY,
        "empty_after_sanitize",
        outcome
            .message()
            .unwrap_or("Input contains no text that can be encoded"),
    )
}

/// Run the pipeline and map suppressed or failed generations to HTTP errors.
async fn run(state: &SharedState, query: &QrQuery) -> Result<Generation, ApiError> {
    let raw = query.text.as_deref().ok_or_else(missing_text)?;
    let request = query.render_request()?;
    let defaults = state.config().render_defaults;

    let generation =
        pipeline::generate(state.encoder(), raw, &request, &defaults, state.api_quota()).await;

    let status = match (generation.suppressed, generation.outcome) {
        (Some(GateReason::Empty), Outcome::Accept) => return Err(missing_text()),
        (Some(GateReason::Empty), outcome) => return Err(empty_after_sanitize(outcome)),
        (Some(GateReason::RateLimited), _) => StatusCode::TOO_MANY_REQUESTS,
        (_, Outcome::Reject(Rejection::GenerationFailed)) => StatusCode::INTERNAL_SERVER_ERROR,
        (_, Outcome::Reject(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => return Ok(generation),
    };

    tracing::debug!(
        status = status.as_u16(),
        code = generation.outcome.code(),
        "QR request refused"
    );
    Err(err_json(
        status,
        generation.outcome.code().unwrap_or("generation_failed"),
        generation.outcome.message().unwrap_or_default(),
    ))
}

/// GET /api/qr
pub async fn generate_qr(
    State(state): State<SharedState>,
    Query(query): Query<QrQuery>,
) -> ApiResult {
    let generation = run(&state, &query).await?;
    let image = generation.image().ok_or_else(|| {
        err_json(
            StatusCode::INTERNAL_SERVER_ERROR,
            Rejection::GenerationFailed.code(),
            Rejection::GenerationFailed.message(),
        )
    })?;

    let warning = generation
        .outcome
        .notice()
        .map(|n| json!({ "code": n.code, "message": n.message }));

    Ok(Json(json!({
        "success": true,
        "image": image.data_url,
        "input": generation.input,
        "options": generation.options,
        "warning": warning,
    })))
}

/// GET /api/qr/download
pub async fn download_qr(
    State(state): State<SharedState>,
    Query(query): Query<QrQuery>,
) -> Result<Response, ApiError> {
    let generation = run(&state, &query).await?;
    let Some(image) = generation.image() else {
        return Err(err_json(
            StatusCode::INTERNAL_SERVER_ERROR,
            Rejection::GenerationFailed.code(),
            Rejection::GenerationFailed.message(),
        ));
    };

    let filename = download::filename(chrono::Utc::now().timestamp_millis());
    Response::builder()
        .header(header::CONTENT_TYPE, "image/png")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::from(image.png.clone()))
        .map_err(|e| {
            err_json(
                StatusCode::INTERNAL_SERVER_ERROR,
                "generation_failed",
                &e.to_string(),
            )
        })
}
