pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

/// Sends a text reply to a chat on behalf of a bot.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Resolves once the platform has answered. Any failure, including a
    /// non-success status from the platform, is returned as an error.
    async fn send_message(&self, bot_token: &str, chat_id: i64, text: &str) -> Result<()>;
}
