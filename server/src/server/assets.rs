//! Embedded web form.

use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use rust_embed::Embed;
use serde_json::json;

#[derive(Embed)]
#[folder = "web/"]
struct WebAssets;

/// Serve the form for bare `/` requests.
pub async fn index() -> Response {
    serve_embedded::<WebAssets>("index.html")
}

/// Fallback: embedded files by path, JSON 404 otherwise.
pub async fn fallback(uri: Uri) -> Response {
    let request_path = uri.path();
    let path = request_path.trim_start_matches('/');

    if is_api_path(request_path) || WebAssets::get(path).is_none() {
        return (
            StatusCode::NOT_FOUND,
            axum::Json(json!({
                "error": "Not Found",
                "path": request_path,
            })),
        )
            .into_response();
    }

    serve_embedded::<WebAssets>(path)
}

fn is_api_path(path: &str) -> bool {
    const API_PREFIXES: [&str; 2] = ["/api", "/ws"];

    API_PREFIXES.iter().any(|prefix| {
        path == *prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

fn serve_embedded<E: Embed>(path: &str) -> Response {
    match E::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref())],
                content.data.to_vec(),
            )
                .into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn detects_api_paths_by_root_segment() {
        for path in ["/api", "/api/qr/nope", "/ws", "/ws/x"] {
            assert!(is_api_path(path), "{path}");
        }
        for path in ["/", "/apiary", "/wsx", "/index.html"] {
            assert!(!is_api_path(path), "{path}");
        }
    }

    #[tokio::test]
    async fn index_serves_html_form() {
        let response = index().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("<form"));
    }

    #[tokio::test]
    async fn unknown_path_returns_404_json() {
        let response = fallback(Uri::from_static("/api/nonexistent")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Not Found");
        assert_eq!(body["path"], "/api/nonexistent");
    }
}
