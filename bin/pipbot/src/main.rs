use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use api::AppState;
use catalog::{CatalogConfig, HttpCatalogSource, StrategyCatalog};
use common::Config;
use dialogue::ConversationEngine;
use dispatch::NotificationDispatcher;
use reasoning::HttpReasoningClient;
use registry::SubscriberStore;
use transport::TelegramSender;

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(port = cfg.port, "PipBot starting");

    // ── Subscriber registry ───────────────────────────────────────────────────
    let store = Arc::new(SubscriberStore::load(&cfg.subscribers_path));

    // ── Strategy catalog ──────────────────────────────────────────────────────
    let categories = CatalogConfig::load(&cfg.catalog_config_path);
    let source = Arc::new(HttpCatalogSource::new(
        &cfg.catalog_base_url,
        Duration::from_secs(cfg.catalog_timeout_secs),
    ));
    let catalog = Arc::new(StrategyCatalog::new(source));

    // ── External clients ──────────────────────────────────────────────────────
    let reasoning = Arc::new(HttpReasoningClient::new(
        &cfg.reasoning_url,
        &cfg.reasoning_api_key,
        Duration::from_secs(cfg.reasoning_timeout_secs),
    ));
    let sender = Arc::new(TelegramSender::new(&cfg.telegram_token));

    // ── Core engines ──────────────────────────────────────────────────────────
    let engine = Arc::new(ConversationEngine::new(
        store.clone(),
        catalog.clone(),
        categories,
        reasoning,
        sender.clone(),
    ));
    let dispatcher = Arc::new(NotificationDispatcher::new(
        store.clone(),
        sender.clone(),
        Duration::from_secs(cfg.send_timeout_secs),
    ));

    // ── Telegram webhook registration ─────────────────────────────────────────
    if let Err(e) = sender.register_webhook(&cfg.webhook_base_url).await {
        warn!(error = %e, "Webhook registration failed — inbound updates will not arrive until it is retried");
    }

    // ── HTTP server ───────────────────────────────────────────────────────────
    let state = AppState {
        engine,
        dispatcher,
        store,
        admin_token: cfg.admin_token.clone(),
    };
    api::serve(state, cfg.port).await;
}
