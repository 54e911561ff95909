//! Text generation client and the fixed sampling policy.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// End-of-sequence token id for GPT-2, used as the pad token.
pub const GPT2_EOS_TOKEN_ID: u32 = 50256;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Empty response")]
    Empty,
}

/// Sampling parameters, serialized as the `parameters` object of a
/// text-generation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationParams {
    /// Prompt plus continuation, in tokens.
    pub max_length: u32,
    pub num_return_sequences: u32,
    pub do_sample: bool,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub no_repeat_ngram_size: u32,
    pub truncation: bool,
    pub pad_token_id: u32,
    /// Keep the echoed prompt in the output; the cleaner strips it.
    pub return_full_text: bool,
}

impl GenerationParams {
    /// The only policy the bot uses.
    pub const POLICY: GenerationParams = GenerationParams {
        max_length: 150,
        num_return_sequences: 1,
        do_sample: true,
        temperature: 0.7,
        top_p: 0.9,
        top_k: 40,
        no_repeat_ngram_size: 3,
        truncation: true,
        pad_token_id: GPT2_EOS_TOKEN_ID,
        return_full_text: true,
    };
}

/// A text-generation backend.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, GenerateError>;
}

/// Calls the backend with [`GenerationParams::POLICY`].
#[derive(Clone)]
pub struct GenerationInvoker {
    backend: Arc<dyn Generator>,
}

impl GenerationInvoker {
    pub fn new(backend: Arc<dyn Generator>) -> Self {
        Self { backend }
    }

    /// Generate a continuation. The result still contains the prompt.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        self.backend.generate(prompt, &GenerationParams::POLICY).await
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParams,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    generated_text: String,
}

/// Hugging Face style text-generation endpoint
/// (`POST {inputs, parameters}` -> `[{generated_text}]`).
pub struct HuggingFaceClient {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HuggingFaceClient {
    pub fn new(endpoint: String, api_key: Option<String>, timeout: Duration) -> Result<Self, GenerateError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerateError::Http(e.to_string()))?;

        Ok(Self {
            endpoint,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl Generator for HuggingFaceClient {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, GenerateError> {
        let preview: String = prompt.chars().take(50).collect();
        info!("🧠 Generating: \"{}\"", preview);

        let request = GenerateRequest {
            inputs: prompt,
            parameters: params,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GenerateError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerateError::Http(format!("failed to read response: {e}")))?;

        debug!("Generator response status: {status}");

        if !status.is_success() {
            return Err(GenerateError::Api(format!("{status}: {body}")));
        }

        parse_generate_response(&body)
    }
}

/// Take the single candidate out of a generation response body.
fn parse_generate_response(body: &str) -> Result<String, GenerateError> {
    let candidates: Vec<Candidate> =
        serde_json::from_str(body).map_err(|e| GenerateError::Parse(e.to_string()))?;

    candidates
        .into_iter()
        .next()
        .map(|c| c.generated_text)
        .ok_or(GenerateError::Empty)
}
