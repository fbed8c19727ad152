use async_trait::async_trait;

use crate::Result;

/// Abstraction over the outbound chat connection.
///
/// `TelegramSender` in `crates/transport` implements this for the real
/// Telegram Bot API. Tests substitute an in-memory recorder.
///
/// The conversation engine uses it for prompts; the notification
/// dispatcher uses it for signal fan-out. Neither retries a failed send —
/// a failure is logged (and, during a broadcast, collected) and the next
/// recipient proceeds.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Deliver one text message to one chat.
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<()>;
}
