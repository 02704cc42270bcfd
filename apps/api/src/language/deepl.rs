//! DeepL translation backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_DEEPL_URL: &str = "https://api-free.deepl.com/v2/translate";
const USER_AGENT: &str = "CoverLetterService/1.0";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("translation API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("translation response contained no text")]
    EmptyResponse,
}

/// Best-effort translation. Failure is reported, never panicked on.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str)
        -> Result<String, TranslationError>;
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: [&'a str; 1],
    target_lang: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
}

#[derive(Clone)]
pub struct DeeplTranslator {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl DeeplTranslator {
    pub fn new(api_key: String, endpoint: String) -> Result<Self, TranslationError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint,
        })
    }
}

#[async_trait]
impl Translator for DeeplTranslator {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(&TranslateRequest {
                text: [text],
                target_lang: target_language,
            })
            .send()
            .await?;

        let status = response.status();
        debug!("DeepL API status: {}", status);

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("DeepL API returned {}: {}", status, message);
            return Err(TranslationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: TranslateResponse = response.json().await?;
        first_translation(body)
    }
}

fn first_translation(body: TranslateResponse) -> Result<String, TranslationError> {
    body.translations
        .into_iter()
        .next()
        .map(|t| t.text)
        .ok_or(TranslationError::EmptyResponse)
}
