use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;

use crate::platform::Notifier;

/// Body of a Bot API `sendMessage` call
#[derive(Debug, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: i64,
    pub text: &'a str,
}

pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base_url: String,
}

impl TelegramNotifier {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn send_message_url(&self, bot_token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base_url, bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, bot_token: &str, chat_id: i64, text: &str) -> Result<()> {
        let body = serde_json::to_vec(&SendMessage { chat_id, text })
            .context("error marshaling response")?;

        debug!("Sending message to chat {}", chat_id);

        let response = self
            .client
            .post(self.send_message_url(bot_token))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            // Strip the URL so the token never ends up in an error message
            .map_err(|e| e.without_url())
            .context("error making request")?;

        if response.status() != StatusCode::OK {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("telegram API error: {}", error_body);
        }

        Ok(())
    }
}
