//! GET /api/settings – effective settings and where they came from.

use axum::Json;
use axum::extract::State;
use serde_json::{json, Value};

use crate::app::SharedState;

pub async fn get_settings(State(state): State<SharedState>) -> Json<Value> {
    let settings = state.settings().get_all_settings();
    Json(json!({ "settings": settings }))
}
