use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use crate::utils::errors::ServiceError;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Text in, text out. The model behind it is opaque to callers.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError>;
}

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(GeminiClient {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    /// The key travels in a header so it never shows up in request URLs.
    fn generate_request(&self, prompt: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, self.model);

        self.http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            }))
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
        let body = self
            .generate_request(prompt)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        extract_text(&body).ok_or_else(|| {
            log::error!("Gemini response without text: {}", body);
            ServiceError::ExternalService("completion response missing text".to_string())
        })
    }
}

/// Concatenates the text parts of the first candidate.
fn extract_text(body: &Value) -> Option<String> {
    let parts = body["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
