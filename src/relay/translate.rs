//! Translation with identity fallback.
//!
//! The gateway never fails: if the backend errors, the caller gets the
//! input text back with `used_fallback` set, and the pipeline carries on
//! with untranslated text.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::relay::language::Language;

/// Default public endpoint used by the Google Translate web widget.
pub const GOOGLE_TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// Source code asking the backend to detect the language itself.
pub const AUTO_DETECT: &str = "auto";

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Empty translation")]
    Empty,
}

/// A translation backend.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslateError>;
}

/// Outcome of a gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translated {
    pub text: String,
    /// True when the backend failed and `text` is the untranslated input.
    pub used_fallback: bool,
}

impl Translated {
    fn ok(text: String) -> Self {
        Self { text, used_fallback: false }
    }

    fn fallback(text: &str) -> Self {
        Self {
            text: text.to_string(),
            used_fallback: true,
        }
    }
}

/// Fail-soft wrapper around a [`Translator`].
#[derive(Clone)]
pub struct TranslationGateway {
    backend: Arc<dyn Translator>,
}

impl TranslationGateway {
    pub fn new(backend: Arc<dyn Translator>) -> Self {
        Self { backend }
    }

    /// Translate `text`, returning it unchanged if the backend fails.
    pub async fn translate(&self, text: &str, source: &str, target: &str) -> Translated {
        match self.backend.translate(text, source, target).await {
            Ok(translated) => {
                debug!("Translated {source} -> {target}: {} chars", translated.chars().count());
                Translated::ok(translated)
            }
            Err(e) => {
                warn!("Translation {source} -> {target} failed, using original text: {e}");
                Translated::fallback(text)
            }
        }
    }

    /// Caller text to English, source auto-detected.
    pub async fn to_english(&self, text: &str) -> Translated {
        self.translate(text, AUTO_DETECT, Language::En.code()).await
    }

    /// English text back to the caller's language. No backend call when
    /// the caller already reads English.
    pub async fn from_english(&self, text: &str, target: Language) -> Translated {
        if target.is_english() {
            return Translated::ok(text.to_string());
        }
        self.translate(text, Language::En.code(), target.code()).await
    }
}

/// Google Translate client (`client=gtx` public endpoint).
pub struct GoogleTranslateClient {
    endpoint: String,
    client: reqwest::Client,
}

impl GoogleTranslateClient {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, TranslateError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TranslateError::Http(e.to_string()))?;
        Ok(Self { endpoint, client })
    }
}

#[async_trait]
impl Translator for GoogleTranslateClient {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslateError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| TranslateError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TranslateError::Api(format!("{status}: {body}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TranslateError::Parse(e.to_string()))?;

        parse_google_response(&body)
    }
}

/// Join the translated segments of a `translate_a/single` response.
///
/// Shape: `[[["Hello ", "Привіт ", ...], ["world", "світ", ...]], null, "uk", ...]`
fn parse_google_response(body: &Value) -> Result<String, TranslateError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::Parse("missing segment list".to_string()))?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        return Err(TranslateError::Empty);
    }
    Ok(text)
}
