//! AI Proxy API client.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ChatMessage, ContentPart};
use crate::error::AgentError;

const AIPROXY_API_URL: &str = "https://api.aiproxy.cloud/v1/chat/completions";
const MODEL: &str = "gpt-4o-mini";
const TEMPERATURE: f64 = 0.7;

/// Client for the AI Proxy chat completions endpoint.
///
/// Every call is a single synchronous request: no retries, no streaming. A
/// hung upstream blocks only the request that invoked it.
pub struct AiProxyClient {
    client: Client,
    token: String,
}

impl AiProxyClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
        }
    }

    /// Send a plain-text prompt and return the completion text.
    pub async fn complete(&self, prompt: &str) -> Result<String, AgentError> {
        self.chat(vec![ChatMessage::user(prompt)]).await
    }

    /// Send a vision prompt: instruction text plus an image data URL.
    pub async fn complete_vision(
        &self,
        prompt: &str,
        image_data_url: &str,
    ) -> Result<String, AgentError> {
        self.chat(vec![ChatMessage::user_parts(vec![
            ContentPart::text(prompt),
            ContentPart::image_url(image_data_url),
        ])])
        .await
    }

    /// Send an audio prompt: instruction text plus base64 audio data.
    pub async fn complete_audio(
        &self,
        prompt: &str,
        audio_base64: &str,
        format: &str,
    ) -> Result<String, AgentError> {
        self.chat(vec![ChatMessage::user_parts(vec![
            ContentPart::text(prompt),
            ContentPart::input_audio(audio_base64, format),
        ])])
        .await
    }

    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, AgentError> {
        let request = CompletionRequest {
            model: MODEL.to_string(),
            messages,
            temperature: TEMPERATURE,
        };

        tracing::debug!("sending completion request: model={}", MODEL);

        let response = self
            .client
            .post(AIPROXY_API_URL)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::Provider(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Provider(format!(
                "HTTP {}: {}",
                status,
                body.trim()
            )));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Provider(format!("unparsable response: {}", e)))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Provider("no choices in response".to_string()))?;

        choice
            .message
            .content
            .ok_or_else(|| AgentError::Provider("no message content in response".to_string()))
    }
}

/// AI Proxy API request format.
#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

/// AI Proxy API response format.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

/// A choice in the completion response.
#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

/// Message in the completion response.
#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}
