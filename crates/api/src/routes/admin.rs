use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

/// Operator-facing inspection routes, behind bearer auth.
pub fn admin_router() -> Router<AppState> {
    Router::new().route("/api/subscribers", get(list_subscribers))
}

async fn list_subscribers(State(state): State<AppState>) -> Json<Value> {
    let subscribers = state.store.list_all().await;
    Json(json!({
        "total": subscribers.len(),
        "subscribers": subscribers,
    }))
}
