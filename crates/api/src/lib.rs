mod auth;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use dialogue::ConversationEngine;
use dispatch::NotificationDispatcher;
use registry::SubscriberStore;

/// Shared application state injected into every route handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConversationEngine>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub store: Arc<SubscriberStore>,
    pub admin_token: String,
}

/// Build and run the Axum webhook server.
pub async fn serve(state: AppState, port: u16) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    let admin = routes::admin_router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_auth,
    ));

    let app = Router::new()
        .merge(routes::hook_router())
        .merge(routes::health_router())
        .merge(admin)
        .with_state(state)
        .layer(cors);

    info!(%addr, "Webhook server listening");
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
