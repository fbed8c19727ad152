use async_trait::async_trait;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::info;
use url::Url;

use common::{ChatTransport, Error, Result};

/// Outbound Telegram sender.
///
/// Inbound updates arrive over the `/telegram` webhook in `crates/api`;
/// this side only pushes messages out and registers the webhook with the
/// Bot API at startup.
pub struct TelegramSender {
    bot: Bot,
}

impl TelegramSender {
    pub fn new(token: &str) -> Self {
        Self {
            bot: Bot::new(token),
        }
    }

    /// Point Telegram at our `/telegram` route. Replaces any previously
    /// registered webhook.
    pub async fn register_webhook(&self, base_url: &str) -> Result<()> {
        let url = Url::parse(&format!("{}/telegram", base_url.trim_end_matches('/')))
            .map_err(|e| Error::Config(format!("invalid WEBHOOK_BASE_URL: {e}")))?;

        self.bot
            .delete_webhook()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        self.bot
            .set_webhook(url.clone())
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        info!(%url, "Telegram webhook registered");
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for TelegramSender {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<()> {
        let id: i64 = chat_id
            .parse()
            .map_err(|_| Error::Transport(format!("non-numeric chat id '{chat_id}'")))?;

        self.bot
            .send_message(ChatId(id), text)
            .parse_mode(ParseMode::Markdown)
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(())
    }
}
