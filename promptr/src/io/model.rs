//! Model API client abstraction.
//!
//! The [`ModelClient`] trait decouples the pipeline from the actual model
//! backend. Production use talks to the OpenAI chat-completions API over
//! blocking HTTP; tests use scripted clients that return predetermined
//! output without any network access.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// One completion request: a resolved model name plus the rendered prompt.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    pub prompt: String,
}

/// Abstraction over model completion backends.
pub trait ModelClient {
    /// Send the prompt and return the raw model output text.
    fn complete(&self, request: &ModelRequest) -> Result<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Client for the OpenAI chat-completions endpoint.
pub struct OpenAiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    api_url: String,
}

impl OpenAiClient {
    /// Build a client from `OPENAI_API_KEY` (and `OPENAI_API_URL` when a
    /// compatible proxy endpoint is in use).
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY is not set"))?;
        let api_url =
            std::env::var("OPENAI_API_URL").unwrap_or_else(|_| OPENAI_API_URL.to_string());
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            api_key,
            api_url,
        })
    }
}

impl ModelClient for OpenAiClient {
    fn complete(&self, request: &ModelRequest) -> Result<String> {
        info!(model = %request.model, prompt_bytes = request.prompt.len(), "requesting completion");
        let body = ChatRequest {
            model: &request.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: 0.0,
        };
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .context("send completion request")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(anyhow!(
                "completion request failed with {status}: {}",
                detail.trim()
            ));
        }

        let parsed: ChatResponse = response.json().context("parse completion response")?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("completion response contained no choices"))?;
        debug!(output_bytes = choice.message.content.len(), "completion received");
        Ok(choice.message.content)
    }
}
