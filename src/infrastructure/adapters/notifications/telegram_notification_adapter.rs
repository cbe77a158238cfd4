/*
Telegram Notification Adapter

Implements the Notifier port on top of the Telegram Bot API `sendMessage` method.

Delivery is best-effort and at-most-once:
- without a bot token and chat id the adapter only logs locally
- otherwise one POST per event, no retry
- network errors and non-success responses are logged and dropped
*/

use crate::application::ports::output::notification_port::{
    NotificationEvent, NotificationPortError, NotificationPortResult, Notifier,
};
use crate::config::application_settings::Secret;
use crate::core::platform::manager::message_formatter::MessageFormatter;
use async_trait::async_trait;
use log::{error, info};
use serde::Serialize;
use std::sync::Arc;

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_PARSE_MODE: &str = "Markdown";

/// Telegram delivery configuration
#[derive(Debug, Clone)]
pub struct TelegramAdapterConfig {
    /// Bot API root, overridable for tests and proxies
    pub api_base_url: String,
    /// Bot token; delivery is disabled without it
    pub bot_token: Option<Secret>,
    /// Target chat; delivery is disabled without it
    pub chat_id: Option<String>,
    /// Telegram `parse_mode` sent with every message
    pub parse_mode: String,
}

impl TelegramAdapterConfig {
    pub fn new(api_base_url: impl Into<String>, bot_token: Option<Secret>, chat_id: Option<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            bot_token,
            chat_id,
            parse_mode: DEFAULT_PARSE_MODE.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Telegram notification adapter
#[derive(Debug)]
pub struct TelegramNotificationAdapter {
    config: TelegramAdapterConfig,
    client: reqwest::Client,
    formatter: Arc<MessageFormatter>,
}

impl TelegramNotificationAdapter {
    pub fn new(config: TelegramAdapterConfig, client: reqwest::Client, formatter: Arc<MessageFormatter>) -> Self {
        Self {
            config,
            client,
            formatter,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials().is_ok()
    }

    fn credentials(&self) -> NotificationPortResult<(&str, &str)> {
        let token = self
            .config
            .bot_token
            .as_ref()
            .map(Secret::expose)
            .filter(|t| !t.trim().is_empty());
        let chat_id = self.config.chat_id.as_deref().filter(|c| !c.trim().is_empty());

        match (token, chat_id) {
            (Some(token), Some(chat_id)) => Ok((token, chat_id)),
            _ => Err(NotificationPortError::NotConfigured),
        }
    }

    fn send_message_url(&self, token: &str) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base_url.trim_end_matches('/'),
            token
        )
    }

    /// Post already-formatted text to the configured chat
    pub async fn send_text(&self, text: &str) -> NotificationPortResult<()> {
        let (token, chat_id) = self.credentials()?;

        let response = self
            .client
            .post(self.send_message_url(token))
            .json(&SendMessageRequest {
                chat_id,
                text,
                parse_mode: &self.config.parse_mode,
            })
            .send()
            .await
            // The request URL embeds the bot token
            .map_err(|e| NotificationPortError::ConnectionError(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationPortError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotificationAdapter {
    async fn notify(&self, event: &NotificationEvent) {
        if !self.is_configured() {
            info!("Telegram not configured, skipping {} notification", event.kind);
            return;
        }

        let text = self.formatter.format(event);
        match self.send_text(&text).await {
            Ok(()) => info!("Telegram notification sent: {}", event.kind),
            Err(e) => error!("Telegram notification failed ({}): {}", event.kind, e),
        }
    }
}
