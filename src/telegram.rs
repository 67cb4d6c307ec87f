//! Telegram Bot API client and inbound update types
//!
//! Covers the two outbound calls this service makes (`setWebhook` on
//! startup, `sendMessage` per reply) and tolerant deserialization of
//! inbound webhook updates. The API base is configurable so tests can
//! point at a mock server.

use crate::config::TelegramConfig;
use crate::error::{NutrisageError, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Inbound webhook update
///
/// Unknown fields are ignored; updates without a message (edits, channel
/// posts) deserialize with `message: None`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// The new incoming message, if this update carries one
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

/// An inbound chat message
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    /// Chat the message was posted in
    pub chat: Chat,
    /// Sender of the message
    #[serde(default)]
    pub from: Option<User>,
    /// Message text, absent for stickers, photos, etc.
    #[serde(default)]
    pub text: Option<String>,
}

/// Chat identifier
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    /// Unique chat id
    pub id: i64,
}

/// Message sender
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// Unique user id
    pub id: i64,
}

/// Client for the Telegram Bot API
pub struct TelegramClient {
    client: Client,
    api_base: String,
    bot_token: String,
}

impl TelegramClient {
    /// Create a new Telegram client
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("nutrisage/0.1.0")
            .build()
            .map_err(|e| {
                NutrisageError::Telegram(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            bot_token: config.bot_token.clone(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    /// Register the public webhook callback URL with Telegram
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or non-success status
    pub async fn set_webhook(&self, webhook_url: &str) -> Result<()> {
        let response = self
            .client
            .post(self.method_url("setWebhook"))
            .json(&json!({ "url": webhook_url }))
            .send()
            .await
            .map_err(|e| NutrisageError::Telegram(format!("setWebhook failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(NutrisageError::Telegram(format!(
                "setWebhook returned {}: {}",
                status, body
            ))
            .into());
        }

        tracing::info!("Webhook set response: {}", body);
        Ok(())
    }

    /// Send a text message to a chat, rendered as Markdown
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or non-success status
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "Markdown"
            }))
            .send()
            .await
            .map_err(|e| NutrisageError::Telegram(format!("sendMessage failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NutrisageError::Telegram(format!(
                "sendMessage returned {}: {}",
                status, body
            ))
            .into());
        }

        Ok(())
    }
}
