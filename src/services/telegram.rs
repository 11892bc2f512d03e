use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use crate::utils::errors::ServiceError;

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[async_trait]
pub trait ChatReplier: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), ServiceError>;
}

#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    bot_token: String,
}

impl TelegramClient {
    pub fn new(bot_token: &str) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(TelegramClient {
            http,
            bot_token: bot_token.to_string(),
        })
    }
}

#[async_trait]
impl ChatReplier for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), ServiceError> {
        let url = format!("{}/bot{}/sendMessage", TELEGRAM_API_URL, self.bot_token);

        self.http
            .post(url)
            .json(&json!({ "chat_id": chat_id, "text": text, "parse_mode": "HTML" }))
            .send()
            .await?
            .error_for_status()?;

        log::info!("✅ Telegram reply sent to {}", chat_id);
        Ok(())
    }
}

/// Used when no bot token is configured: replies are only logged.
pub struct LogReplier;

#[async_trait]
impl ChatReplier for LogReplier {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), ServiceError> {
        log::warn!("TELEGRAM_BOT_TOKEN not configured, dropping reply to {}: {}", chat_id, text);
        Ok(())
    }
}
