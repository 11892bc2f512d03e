use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::gemini::{CompletionClient, GeminiClient};
use crate::services::telegram::{ChatReplier, LogReplier, TelegramClient};
use crate::utils::errors::ServiceError;
use crate::utils::time::{Clock, SystemClock};

/// Collaborators shared by every handler besides the database and config.
#[derive(Clone)]
pub struct AppServices {
    pub clock: Arc<dyn Clock>,
    pub completion: Option<Arc<dyn CompletionClient>>,
    pub replier: Arc<dyn ChatReplier>,
}

impl AppServices {
    pub fn from_config(config: &AppConfig) -> Result<Self, ServiceError> {
        let completion: Option<Arc<dyn CompletionClient>> = match config.gemini_api_key {
            Some(ref key) => {
                let client = GeminiClient::new(key, &config.gemini_model)?;
                Some(Arc::new(client) as Arc<dyn CompletionClient>)
            }
            None => {
                log::warn!("GEMINI_API_KEY not set, chat-bot task creation and AI reports disabled");
                None
            }
        };

        let replier: Arc<dyn ChatReplier> = match config.telegram_bot_token {
            Some(ref token) => Arc::new(TelegramClient::new(token)?) as Arc<dyn ChatReplier>,
            None => Arc::new(LogReplier) as Arc<dyn ChatReplier>,
        };

        Ok(AppServices {
            clock: Arc::new(SystemClock) as Arc<dyn Clock>,
            completion,
            replier,
        })
    }
}
