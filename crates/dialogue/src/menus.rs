//! Closed option sets and prompt text for the configuration dialogue.
//!
//! Dispatch is by exact (trimmed) match against these sets, so the prompt
//! text must list exactly what the engine accepts.

use common::Subscriber;

pub const SYMBOLS: &[&str] = &[
    "EUR/USD", "GBP/USD", "USD/JPY", "AUD/USD", "USD/CAD", "EUR/JPY",
];
pub const TIMEFRAMES: &[&str] = &["M1", "M5", "M15"];
pub const EXPIRATIONS: &[&str] = &["3min", "5min", "7min"];
pub const SESSIONS: &[&str] = &["Asian", "European", "American"];

pub const IDLE_PROMPT: &str =
    "\u{1F4E1} Send /start to begin receiving signals and configure your setup.";

pub const MAIN_PROMPT: &str = "Main menu — send one of:\n\
     settings — configure your setup\n\
     analysis — request an AI read on your setup\n\
     enable / disable — toggle signal delivery\n\
     /status — show your profile\n\
     /reset — start over";

pub const SETTINGS_PROMPT: &str = "Settings — choose what to change:\n\
     symbol, timeframe, expiration, session, strategy\n\
     Send back for the main menu.";

pub fn welcome(name: &str) -> String {
    let greeting = if name.is_empty() {
        "\u{1F4E1} PipBot is live.".to_string()
    } else {
        format!("\u{1F4E1} PipBot is live, {name}.")
    };
    format!("{greeting} Signal delivery is on.\n\n{MAIN_PROMPT}")
}

/// Exact-match an input against a fixed option set.
pub fn pick(options: &[&str], input: &str) -> Option<String> {
    options.iter().find(|o| **o == input).map(|o| o.to_string())
}

pub fn options_prompt(label: &str, options: &[&str]) -> String {
    format!("Pick a {label}:\n{}", options.join("\n"))
}

pub fn selection_saved(label: &str, choice: &str) -> String {
    format!("\u{2705} {label} set to {choice}.\n\n{SETTINGS_PROMPT}")
}

pub fn category_prompt(labels: &[&str]) -> String {
    format!("Pick a strategy category:\n{}", labels.join("\n"))
}

pub fn strategy_prompt(category: &str, names: impl Iterator<Item = impl AsRef<str>>) -> String {
    let list = names
        .map(|n| n.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    format!("Strategies in {category}:\n{list}")
}

pub fn status_text(sub: &Subscriber) -> String {
    fn shown(v: &Option<String>) -> &str {
        v.as_deref().unwrap_or("-")
    }
    let name = if sub.name.is_empty() { "Unknown" } else { &sub.name };
    let delivery = if sub.enabled { "enabled" } else { "disabled" };
    format!(
        "\u{1F464} Subscriber: {name}\n\
         \u{1F4C5} Joined: {}\n\
         \u{1F4AC} Signals: {delivery}\n\
         Symbol: {} | Timeframe: {} | Expiration: {}\n\
         Session: {} | Strategy: {}",
        sub.joined,
        shown(&sub.symbol),
        shown(&sub.timeframe),
        shown(&sub.expiration),
        shown(&sub.session),
        shown(&sub.strategy),
    )
}
