//! The text generation capability behind AI insights.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::Error;

const OPENAI_API_URL: &str = "https://api.openai.com/v1";
const PROVIDER_NAME: &str = "OpenAI";

/// The model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Turns a prompt into free text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a response to `prompt`.
    async fn generate_text(&self, prompt: &str) -> Result<String, Error>;
}

/// A [TextGenerator] using the OpenAI Chat Completions API.
pub struct OpenAiClient {
    api_key: String,
    model: String,
    client: Client,
    endpoint: String,
}

impl OpenAiClient {
    /// Create a client for `model`, falling back to [DEFAULT_MODEL] if `model` is empty.
    pub fn new(api_key: &str, model: &str) -> Self {
        let model = if model.trim().is_empty() {
            DEFAULT_MODEL
        } else {
            model.trim()
        };

        Self {
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            client: Client::new(),
            endpoint: OPENAI_API_URL.to_owned(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

fn provider_error(error: impl std::fmt::Display) -> Error {
    Error::ProviderError {
        provider: PROVIDER_NAME,
        message: error.to_string(),
    }
}

fn first_message(completion: ChatCompletion) -> Result<String, Error> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| provider_error("the response did not contain a message"))
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, Error> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": [{ "role": "user", "content": prompt }],
            }))
            .send()
            .await
            .map_err(provider_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(provider_error(format!("OpenAI returned {status}: {body}")));
        }

        let completion: ChatCompletion = response.json().await.map_err(provider_error)?;

        first_message(completion)
    }
}
