use std::sync::Arc;

use tracing::{debug, warn};

use catalog::{CatalogConfig, StrategyCatalog};
use common::{AnalysisRequest, ChatTransport, ReasoningClient, Result, Step, Subscriber};
use registry::SubscriberStore;

use crate::menus;

/// Drives the per-subscriber configuration dialogue.
///
/// Each inbound text is either a structural command (valid from any
/// step), a selection from the currently-open menu's closed option set,
/// or the analysis request. Every accepted selection persists through the
/// registry before the next prompt goes out, and unrecognized input
/// always lands on a known prompt.
pub struct ConversationEngine {
    store: Arc<SubscriberStore>,
    catalog: Arc<StrategyCatalog>,
    categories: CatalogConfig,
    reasoning: Arc<dyn ReasoningClient>,
    transport: Arc<dyn ChatTransport>,
}

impl ConversationEngine {
    pub fn new(
        store: Arc<SubscriberStore>,
        catalog: Arc<StrategyCatalog>,
        categories: CatalogConfig,
        reasoning: Arc<dyn ReasoningClient>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            store,
            catalog,
            categories,
            reasoning,
            transport,
        }
    }

    /// Handle one inbound chat message.
    ///
    /// First contact creates the subscriber record (`enabled = true`)
    /// before anything else happens.
    pub async fn handle_message(
        &self,
        chat_id: &str,
        display_name: &str,
        text: &str,
    ) -> Result<()> {
        let text = text.trim();
        let name = display_name.trim().to_string();
        let sub = self
            .store
            .upsert(chat_id, |s| {
                if s.name.is_empty() && !name.is_empty() {
                    s.name = name.clone();
                }
            })
            .await?;
        debug!(chat_id, step = %sub.step, input = text, "Dialogue input");

        // Structural commands work from any step.
        match text {
            "/start" => {
                self.store
                    .upsert(chat_id, |s| {
                        s.enabled = true;
                        s.step = Step::Main;
                    })
                    .await?;
                return self.send(chat_id, &menus::welcome(&sub.name)).await;
            }
            "/status" => return self.send(chat_id, &menus::status_text(&sub)).await,
            "/reset" => {
                self.store.upsert(chat_id, |s| s.clear_selections()).await?;
                return self
                    .send(chat_id, &format!("Setup cleared.\n\n{}", menus::IDLE_PROMPT))
                    .await;
            }
            "back" => {
                self.store.upsert(chat_id, |s| s.step = Step::Main).await?;
                return self.send(chat_id, menus::MAIN_PROMPT).await;
            }
            "enable" => {
                self.store.set_enabled(chat_id, true).await?;
                return self.send(chat_id, "\u{2705} Signals enabled.").await;
            }
            "disable" => {
                self.store.set_enabled(chat_id, false).await?;
                return self.send(chat_id, "\u{26D4} Signals disabled.").await;
            }
            _ => {}
        }

        match sub.step.clone() {
            Step::Idle => self.send(chat_id, menus::IDLE_PROMPT).await,
            Step::Main => self.on_main(chat_id, text).await,
            Step::Settings => self.on_settings(chat_id, text).await,
            Step::SymbolMenu => {
                self.on_leaf(chat_id, text, "symbol", menus::SYMBOLS, |s, v| {
                    s.symbol = Some(v)
                })
                .await
            }
            Step::TimeframeMenu => {
                self.on_leaf(chat_id, text, "timeframe", menus::TIMEFRAMES, |s, v| {
                    s.timeframe = Some(v)
                })
                .await
            }
            Step::ExpirationMenu => {
                self.on_leaf(chat_id, text, "expiration", menus::EXPIRATIONS, |s, v| {
                    s.expiration = Some(v)
                })
                .await
            }
            Step::SessionMenu => {
                self.on_leaf(chat_id, text, "session", menus::SESSIONS, |s, v| {
                    s.session = Some(v)
                })
                .await
            }
            Step::CategoryMenu => self.on_category(chat_id, text).await,
            Step::StrategyMenu { category } => self.on_strategy(chat_id, &category, text).await,
        }
    }

    async fn on_main(&self, chat_id: &str, text: &str) -> Result<()> {
        match text {
            "settings" => {
                self.store
                    .upsert(chat_id, |s| s.step = Step::Settings)
                    .await?;
                self.send(chat_id, menus::SETTINGS_PROMPT).await
            }
            "analysis" => self.run_analysis(chat_id).await,
            _ => self.send(chat_id, menus::MAIN_PROMPT).await,
        }
    }

    async fn on_settings(&self, chat_id: &str, text: &str) -> Result<()> {
        let (step, prompt) = match text {
            "symbol" => (
                Step::SymbolMenu,
                menus::options_prompt("symbol", menus::SYMBOLS),
            ),
            "timeframe" => (
                Step::TimeframeMenu,
                menus::options_prompt("timeframe", menus::TIMEFRAMES),
            ),
            "expiration" => (
                Step::ExpirationMenu,
                menus::options_prompt("expiration", menus::EXPIRATIONS),
            ),
            "session" => (
                Step::SessionMenu,
                menus::options_prompt("session", menus::SESSIONS),
            ),
            "strategy" => (
                Step::CategoryMenu,
                menus::category_prompt(&self.categories.labels()),
            ),
            _ => return self.send(chat_id, menus::SETTINGS_PROMPT).await,
        };
        self.store.upsert(chat_id, |s| s.step = step).await?;
        self.send(chat_id, &prompt).await
    }

    /// A leaf menu: a valid option writes the selection and returns to
    /// settings; anything else re-prompts without changing step.
    async fn on_leaf(
        &self,
        chat_id: &str,
        text: &str,
        label: &str,
        options: &[&str],
        set: fn(&mut Subscriber, String),
    ) -> Result<()> {
        match menus::pick(options, text) {
            Some(choice) => {
                self.store
                    .upsert(chat_id, |s| {
                        set(s, choice.clone());
                        s.step = Step::Settings;
                    })
                    .await?;
                self.send(chat_id, &menus::selection_saved(label, &choice))
                    .await
            }
            None => self.send(chat_id, &menus::options_prompt(label, options)).await,
        }
    }

    async fn on_category(&self, chat_id: &str, text: &str) -> Result<()> {
        let Some(category) = self.categories.find(text) else {
            return self
                .send(chat_id, &menus::category_prompt(&self.categories.labels()))
                .await;
        };

        // Always a live reload; the resident set only serves the pick below.
        let strategies = self.catalog.load_category(&category.key).await;
        if strategies.is_empty() {
            return self
                .send(
                    chat_id,
                    "No strategies available in this category right now. Pick a different category.",
                )
                .await;
        }

        let label = category.label.clone();
        self.store
            .upsert(chat_id, |s| {
                s.step = Step::StrategyMenu {
                    category: label.clone(),
                }
            })
            .await?;
        self.send(
            chat_id,
            &menus::strategy_prompt(&category.label, strategies.keys()),
        )
        .await
    }

    async fn on_strategy(&self, chat_id: &str, category: &str, text: &str) -> Result<()> {
        let strategies = self.catalog.strategies().await;
        match strategies.get(text) {
            Some(description) => {
                let choice = text.to_string();
                self.store
                    .upsert(chat_id, |s| {
                        s.strategy = Some(choice.clone());
                        s.step = Step::Settings;
                    })
                    .await?;
                self.send(
                    chat_id,
                    &format!(
                        "\u{2705} strategy set to {text}.\n{description}\n\n{}",
                        menus::SETTINGS_PROMPT
                    ),
                )
                .await
            }
            None => {
                self.send(chat_id, &menus::strategy_prompt(category, strategies.keys()))
                    .await
            }
        }
    }

    /// Delegate to the reasoning service and relay its text. Any failure
    /// degrades to an apologetic message; the dialogue stays on `Main`.
    async fn run_analysis(&self, chat_id: &str) -> Result<()> {
        let Some(sub) = self.store.get(chat_id).await else {
            return self.send(chat_id, menus::IDLE_PROMPT).await;
        };
        if sub.symbol.is_none() {
            return self
                .send(
                    chat_id,
                    "Set a symbol in settings before requesting analysis.",
                )
                .await;
        }

        let request = AnalysisRequest::from_subscriber(&sub);
        match self.reasoning.analyze(&request).await {
            Ok(analysis) => self.send(chat_id, &analysis).await,
            Err(e) => {
                warn!(chat_id, error = %e, "Reasoning service call failed");
                self.send(chat_id, "Analysis is unavailable right now. Try again later.")
                    .await
            }
        }
    }

    async fn send(&self, chat_id: &str, text: &str) -> Result<()> {
        self.transport.send_text(chat_id, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use catalog::{CatalogRow, CatalogSource, CategoryConfig};
    use common::Error;
    use std::path::PathBuf;
    use tokio::sync::Mutex;

    struct RecordingTransport {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ChatTransport for RecordingTransport {
        async fn send_text(&self, chat_id: &str, text: &str) -> Result<()> {
            self.sent
                .lock()
                .await
                .push((chat_id.to_string(), text.to_string()));
            Ok(())
        }
    }

    impl RecordingTransport {
        async fn last(&self) -> String {
            self.sent.lock().await.last().map(|(_, t)| t.clone()).unwrap_or_default()
        }
    }

    struct CannedSource {
        rows: Vec<CatalogRow>,
        fail: bool,
    }

    #[async_trait]
    impl CatalogSource for CannedSource {
        async fn fetch_category(&self, key: &str) -> Result<Vec<CatalogRow>> {
            if self.fail {
                return Err(Error::Catalog(format!("unreachable source for '{key}'")));
            }
            Ok(self.rows.clone())
        }
    }

    struct StubReasoning {
        reply: Result<&'static str, &'static str>,
    }

    #[async_trait]
    impl ReasoningClient for StubReasoning {
        async fn analyze(&self, _request: &AnalysisRequest) -> Result<String> {
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(e) => Err(Error::Reasoning(e.to_string())),
            }
        }
    }

    struct Harness {
        engine: ConversationEngine,
        store: Arc<SubscriberStore>,
        transport: Arc<RecordingTransport>,
        path: PathBuf,
    }

    impl Drop for Harness {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    fn harness(tag: &str, source: CannedSource, reasoning: StubReasoning) -> Harness {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .subsec_nanos();
        let path = std::env::temp_dir().join(format!(
            "pipbot-dialogue-{tag}-{}-{nanos}.json",
            std::process::id()
        ));
        let store = Arc::new(SubscriberStore::load(&path));
        let transport = Arc::new(RecordingTransport {
            sent: Mutex::new(Vec::new()),
        });
        let categories = CatalogConfig {
            categories: vec![
                CategoryConfig {
                    label: "Trend".to_string(),
                    key: "trend".to_string(),
                },
                CategoryConfig {
                    label: "Reversal".to_string(),
                    key: "reversal".to_string(),
                },
            ],
        };
        let engine = ConversationEngine::new(
            store.clone(),
            Arc::new(StrategyCatalog::new(Arc::new(source))),
            categories,
            Arc::new(reasoning),
            transport.clone(),
        );
        Harness {
            engine,
            store,
            transport,
            path,
        }
    }

    fn breakout_rows() -> CannedSource {
        CannedSource {
            rows: vec![CatalogRow {
                name: Some("Breakout".to_string()),
                description: Some("Trade the break of a range.".to_string()),
            }],
            fail: false,
        }
    }

    fn ok_reasoning() -> StubReasoning {
        StubReasoning { reply: Ok("Looks constructive above 1.0850.") }
    }

    #[tokio::test]
    async fn first_message_creates_enabled_subscriber() {
        let h = harness("first-contact", breakout_rows(), ok_reasoning());

        h.engine.handle_message("555", "Dana", "hello?").await.unwrap();

        let sub = h.store.get("555").await.expect("record created");
        assert!(sub.enabled);
        assert_eq!(sub.name, "Dana");
        assert_eq!(sub.step, Step::Idle);
        assert_eq!(h.transport.last().await, menus::IDLE_PROMPT);
    }

    #[tokio::test]
    async fn full_configuration_scenario() {
        let h = harness("scenario", breakout_rows(), ok_reasoning());
        let msgs = [
            "/start", "settings", "symbol", "EUR/USD", "timeframe", "M5",
            "expiration", "5min", "strategy", "Trend", "Breakout",
        ];
        for msg in msgs {
            h.engine.handle_message("42", "Ana", msg).await.unwrap();
        }

        let sub = h.store.get("42").await.unwrap();
        assert_eq!(sub.symbol.as_deref(), Some("EUR/USD"));
        assert_eq!(sub.timeframe.as_deref(), Some("M5"));
        assert_eq!(sub.expiration.as_deref(), Some("5min"));
        assert_eq!(sub.strategy.as_deref(), Some("Breakout"));
        assert_eq!(sub.step, Step::Settings);
    }

    #[tokio::test]
    async fn empty_category_keeps_subscriber_in_category_menu() {
        let h = harness(
            "empty-category",
            CannedSource { rows: vec![], fail: true },
            ok_reasoning(),
        );
        for msg in ["/start", "settings", "strategy", "Trend"] {
            h.engine.handle_message("9", "Kim", msg).await.unwrap();
        }

        let sub = h.store.get("9").await.unwrap();
        assert_eq!(sub.step, Step::CategoryMenu);
        assert!(sub.strategy.is_none());
        assert!(h.transport.last().await.contains("different category"));
    }

    #[tokio::test]
    async fn invalid_leaf_option_reprompts_without_advancing() {
        let h = harness("invalid-option", breakout_rows(), ok_reasoning());
        for msg in ["/start", "settings", "timeframe", "H4"] {
            h.engine.handle_message("12", "Lee", msg).await.unwrap();
        }

        let sub = h.store.get("12").await.unwrap();
        assert_eq!(sub.step, Step::TimeframeMenu);
        assert!(sub.timeframe.is_none());
        assert!(h.transport.last().await.contains("M15"));
    }

    #[tokio::test]
    async fn unrecognized_main_input_falls_back_to_help() {
        let h = harness("fallback", breakout_rows(), ok_reasoning());
        h.engine.handle_message("3", "Pat", "/start").await.unwrap();
        h.engine.handle_message("3", "Pat", "do the thing").await.unwrap();

        let sub = h.store.get("3").await.unwrap();
        assert_eq!(sub.step, Step::Main);
        assert_eq!(h.transport.last().await, menus::MAIN_PROMPT);
    }

    #[tokio::test]
    async fn enable_disable_toggle_delivery() {
        let h = harness("toggle", breakout_rows(), ok_reasoning());
        h.engine.handle_message("21", "Ira", "/start").await.unwrap();
        h.engine.handle_message("21", "Ira", "disable").await.unwrap();
        assert!(!h.store.get("21").await.unwrap().enabled);

        h.engine.handle_message("21", "Ira", "enable").await.unwrap();
        assert!(h.store.get("21").await.unwrap().enabled);
    }

    #[tokio::test]
    async fn reset_clears_selections_and_returns_to_idle() {
        let h = harness("reset", breakout_rows(), ok_reasoning());
        for msg in ["/start", "settings", "symbol", "EUR/USD", "/reset"] {
            h.engine.handle_message("31", "Max", msg).await.unwrap();
        }

        let sub = h.store.get("31").await.unwrap();
        assert_eq!(sub.step, Step::Idle);
        assert!(sub.symbol.is_none());
    }

    #[tokio::test]
    async fn analysis_requires_a_configured_symbol() {
        let h = harness("analysis-unset", breakout_rows(), ok_reasoning());
        h.engine.handle_message("51", "Noa", "/start").await.unwrap();
        h.engine.handle_message("51", "Noa", "analysis").await.unwrap();

        assert!(h.transport.last().await.contains("Set a symbol"));
        assert_eq!(h.store.get("51").await.unwrap().step, Step::Main);
    }

    #[tokio::test]
    async fn analysis_relays_reasoning_text() {
        let h = harness("analysis-ok", breakout_rows(), ok_reasoning());
        for msg in ["/start", "settings", "symbol", "EUR/USD", "back", "analysis"] {
            h.engine.handle_message("52", "Ivy", msg).await.unwrap();
        }

        assert_eq!(h.transport.last().await, "Looks constructive above 1.0850.");
    }

    #[tokio::test]
    async fn analysis_failure_degrades_to_message() {
        let h = harness(
            "analysis-err",
            breakout_rows(),
            StubReasoning { reply: Err("upstream 503") },
        );
        for msg in ["/start", "settings", "symbol", "EUR/USD", "back", "analysis"] {
            h.engine.handle_message("53", "Uma", msg).await.unwrap();
        }

        assert!(h.transport.last().await.contains("unavailable"));
    }

    #[tokio::test]
    async fn session_selection_returns_to_settings() {
        let h = harness("session", breakout_rows(), ok_reasoning());
        for msg in ["/start", "settings", "session", "European"] {
            h.engine.handle_message("61", "Gil", msg).await.unwrap();
        }

        let sub = h.store.get("61").await.unwrap();
        assert_eq!(sub.session.as_deref(), Some("European"));
        assert_eq!(sub.step, Step::Settings);
    }
}
