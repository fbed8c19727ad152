use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use common::SignalEvent;
use dispatch::format_signal;

use crate::AppState;

pub fn hook_router() -> Router<AppState> {
    Router::new()
        .route("/telegram", post(telegram_update))
        .route("/webhook", post(signal_webhook))
}

// ─── Telegram update ──────────────────────────────────────────────────────────

/// Minimal slice of a Telegram update. Everything beyond what the
/// dialogue consumes is ignored on the floor.
#[derive(Debug, Deserialize)]
struct ChatUpdate {
    #[serde(default)]
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    chat: Chat,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    from: Option<Sender>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct Sender {
    #[serde(default)]
    first_name: String,
}

/// The chat transport retries undelivered updates, so this route always
/// acknowledges; anything it cannot use is logged and dropped.
async fn telegram_update(State(state): State<AppState>, body: Bytes) -> &'static str {
    let update: ChatUpdate = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, "Unparseable Telegram update — dropped");
            return "OK";
        }
    };

    // No message (edited posts, service events) is a no-op.
    let Some(message) = update.message else {
        return "OK";
    };
    let Some(text) = message.text else {
        return "OK";
    };

    let chat_id = message.chat.id.to_string();
    let name = message.from.map(|s| s.first_name).unwrap_or_default();

    if let Err(e) = state.engine.handle_message(&chat_id, &name, &text).await {
        warn!(chat_id = %chat_id, error = %e, "Dialogue handling failed");
    }
    "OK"
}

// ─── Signal webhook ───────────────────────────────────────────────────────────

/// Inbound signal from the market-data source. A missing or unparseable
/// body is a client error; per-recipient delivery failures are not.
async fn signal_webhook(State(state): State<AppState>, body: Bytes) -> Response {
    if body.is_empty() {
        return (StatusCode::BAD_REQUEST, "No data").into_response();
    }
    let event: SignalEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Unparseable signal payload");
            return (StatusCode::BAD_REQUEST, "No data").into_response();
        }
    };

    let text = format_signal(&event);
    let report = state.dispatcher.broadcast(&text).await;

    Json(json!({
        "status": "ok",
        "sent": report.sent,
        "failed": report.failed.len(),
    }))
    .into_response()
}
