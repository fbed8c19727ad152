use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

pub fn health_router() -> Router<AppState> {
    Router::new().route("/healthz", get(healthz))
}

/// Health check endpoint — no auth required.
async fn healthz(State(state): State<AppState>) -> Json<Value> {
    let (subscribers, enabled) = state.store.counts().await;
    Json(json!({
        "status": "ok",
        "subscribers": subscribers,
        "enabled": enabled,
    }))
}
