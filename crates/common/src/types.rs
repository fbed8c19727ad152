use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Where a subscriber currently is in the configuration dialogue.
///
/// Persisted on the subscriber record so a restart resumes the
/// conversation exactly where it left off. Every leaf menu returns to
/// `Settings` on a valid pick; `back` always returns to `Main`; `/reset`
/// returns to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "menu", rename_all = "snake_case")]
pub enum Step {
    #[default]
    Idle,
    Main,
    Settings,
    SymbolMenu,
    TimeframeMenu,
    ExpirationMenu,
    SessionMenu,
    CategoryMenu,
    StrategyMenu { category: String },
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Idle => write!(f, "idle"),
            Step::Main => write!(f, "main"),
            Step::Settings => write!(f, "settings"),
            Step::SymbolMenu => write!(f, "symbol menu"),
            Step::TimeframeMenu => write!(f, "timeframe menu"),
            Step::ExpirationMenu => write!(f, "expiration menu"),
            Step::SessionMenu => write!(f, "session menu"),
            Step::CategoryMenu => write!(f, "category menu"),
            Step::StrategyMenu { category } => write!(f, "strategy menu ({category})"),
        }
    }
}

/// One registered chat user.
///
/// Created on first contact with `enabled = true`. Selections stay `None`
/// until chosen through the dialogue. Mutated only via
/// `SubscriberStore::upsert`, which rewrites the durable record before the
/// mutation is observable anywhere else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Opaque chat identifier. Unique, string-comparable.
    pub id: String,
    /// Display name captured from the first message.
    pub name: String,
    /// Join date, `YYYY-MM-DD`.
    pub joined: String,
    /// Whether signal broadcasts are delivered to this subscriber.
    pub enabled: bool,
    #[serde(default)]
    pub step: Step,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
}

impl Subscriber {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            joined: Utc::now().format("%Y-%m-%d").to_string(),
            enabled: true,
            step: Step::Idle,
            symbol: None,
            timeframe: None,
            expiration: None,
            session: None,
            strategy: None,
        }
    }

    /// Drop all dialogue selections and return to the idle step.
    pub fn clear_selections(&mut self) {
        self.symbol = None;
        self.timeframe = None;
        self.expiration = None;
        self.session = None;
        self.strategy = None;
        self.step = Step::Idle;
    }
}

/// Inbound signal payload from the market-data webhook.
///
/// Every field is optional; the formatter substitutes defaults. The
/// payload lives for one webhook call and is never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalEvent {
    #[serde(default)]
    pub signal: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub expiration: Option<String>,
}
