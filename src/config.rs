use std::env;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub environment: String,
    pub frontend_urls: Vec<String>,
    pub sweep_interval: Option<Duration>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub telegram_bot_token: Option<String>,
    pub manager_telegram_id: Option<i64>,
    pub manager_user_id: Option<Uuid>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| var(key).ok_or_else(|| ConfigError::MissingVariable(key.to_string()));

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let environment = var("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let port = var("SERVER_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidFormat("SERVER_PORT must be a valid port number".to_string()))?;

        // Parse allowed origins
        let frontend_urls = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let sweep_interval = match var("SWEEP_INTERVAL_MINUTES") {
            None => None,
            Some(raw) => match raw.parse::<u64>() {
                Ok(minutes) if minutes > 0 => Some(Duration::from_secs(minutes * 60)),
                _ => {
                    return Err(ConfigError::InvalidFormat(
                        "SWEEP_INTERVAL_MINUTES must be a positive number of minutes".to_string(),
                    ))
                }
            },
        };

        let manager_telegram_id = var("MANAGER_TELEGRAM_ID")
            .map(|raw| raw.parse::<i64>())
            .transpose()
            .map_err(|_| ConfigError::InvalidFormat("MANAGER_TELEGRAM_ID must be an integer".to_string()))?;

        let manager_user_id = var("MANAGER_USER_ID")
            .map(|raw| Uuid::parse_str(&raw))
            .transpose()
            .map_err(|_| ConfigError::InvalidFormat("MANAGER_USER_ID must be a UUID".to_string()))?;

        Ok(AppConfig {
            database_url,
            jwt_secret,
            environment,
            port,
            frontend_urls,
            sweep_interval,
            gemini_api_key: var("GEMINI_API_KEY"),
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            telegram_bot_token: var("TELEGRAM_BOT_TOKEN"),
            manager_telegram_id,
            manager_user_id,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const BASE: [(&str, &str); 2] = [("DATABASE_URL", "postgres://localhost/tasks"), ("JWT_SECRET", "s3cret")];

    #[test]
    fn defaults_apply() {
        let config = load(&BASE).unwrap();

        assert_eq!(config.port, 8080);
        assert!(config.is_development());
        assert_eq!(config.frontend_urls, vec!["http://localhost:3000".to_string()]);
        assert_eq!(config.sweep_interval, None);
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert!(config.manager_user_id.is_none());
    }

    #[test]
    fn missing_database_url_is_reported() {
        let err = load(&[("JWT_SECRET", "s")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVariable(ref v) if v == "DATABASE_URL"));
    }

    #[test]
    fn sweep_interval_in_minutes() {
        let mut pairs = BASE.to_vec();
        pairs.push(("SWEEP_INTERVAL_MINUTES", "15"));
        assert_eq!(load(&pairs).unwrap().sweep_interval, Some(Duration::from_secs(900)));

        let mut zero = BASE.to_vec();
        zero.push(("SWEEP_INTERVAL_MINUTES", "0"));
        assert!(matches!(load(&zero), Err(ConfigError::InvalidFormat(_))));
    }

    #[test]
    fn chat_bot_settings_are_parsed() {
        let mut pairs = BASE.to_vec();
        pairs.push(("MANAGER_TELEGRAM_ID", "123456789"));
        pairs.push(("MANAGER_USER_ID", "7f1b8a52-4c1e-4b8f-9d55-0e7a2b3c4d5e"));
        pairs.push(("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test"));

        let config = load(&pairs).unwrap();

        assert_eq!(config.manager_telegram_id, Some(123456789));
        assert!(config.manager_user_id.is_some());
        assert_eq!(config.frontend_urls.len(), 2);
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut pairs = BASE.to_vec();
        pairs.push(("SERVER_PORT", "eighty"));
        assert!(matches!(load(&pairs), Err(ConfigError::InvalidFormat(_))));
    }
}
