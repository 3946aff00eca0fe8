//! Telegram Bot API notifier adapter.
//!
//! Implements the `Notifier` port against the Bot API `sendMessage` call.
//! Every request carries its own bounded timeout, so a stalled provider
//! cannot hold a caller longer than the configured bound. The registration
//! path does not await the send at all.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::json;
use std::time::Duration;

use crate::config::TelegramConfig;
use crate::domain::foundation::ExternalUserId;
use crate::ports::{Notifier, NotifyError};

/// Telegram notifier adapter.
pub struct TelegramNotifier {
    config: TelegramConfig,
    http_client: reqwest::Client,
}

impl TelegramNotifier {
    /// Create a new Telegram notifier with the given configuration.
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base_url,
            self.config.bot_token.expose_secret()
        )
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, recipient: ExternalUserId, text: &str) -> Result<(), NotifyError> {
        let body = json!({
            "chat_id": recipient.to_string(),
            "text": text,
            "parse_mode": "HTML",
        });

        let response = self
            .http_client
            .post(self.send_message_url())
            .timeout(self.timeout())
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "Telegram sendMessage rejected");
            return Err(NotifyError::Provider(format!("{}: {}", status, detail)));
        }

        tracing::debug!(recipient = %recipient, "Telegram confirmation sent");
        Ok(())
    }
}
