//! Mistral chat-completion transport
//!
//! Owns the HTTP client, the bearer credential, and the retry loop. Callers
//! see one logical request per [`MistralClient::chat_complete`] call.

use std::time::Instant;

use reqwest::{header, Client, Response};
use serde::{Deserialize, Serialize};

use super::{retry::RetryConfig, GenerationParams};
use crate::{
    error::{RagError, Result},
    messages::{Message, Role},
};

/// HTTP client for the Mistral API
#[derive(Debug, Clone)]
pub struct MistralClient {
    http: Client,
    base_url: String,
    retry: RetryConfig,
}

impl MistralClient {
    /// Create a client bound to `api_key`
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not a valid header value or the HTTP
    /// client cannot be built
    pub fn new(api_key: &str, base_url: impl Into<String>, retry: RetryConfig) -> Result<Self> {
        let http = Client::builder()
            .default_headers({
                let mut headers = header::HeaderMap::new();
                let mut auth = header::HeaderValue::from_str(&format!("Bearer {api_key}"))
                    .map_err(|_| RagError::InvalidConfig("Invalid API key format".to_string()))?;
                auth.set_sensitive(true);
                headers.insert(header::AUTHORIZATION, auth);
                headers.insert(
                    header::ACCEPT,
                    header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
        })
    }

    #[must_use]
    pub const fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Send a chat-completion request, retrying per the configured policy
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Api`] for a non-success status that was not
    /// retried or outlived the retry budget, and [`RagError::Http`] for
    /// transport failures
    pub async fn chat_complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let started = Instant::now();
        let mut retries = 0u32;

        loop {
            tracing::debug!(model = %request.model, attempt = retries + 1, "dispatching chat completion");

            let error = match self.http.post(&url).json(request).send().await {
                Ok(response) if response.status().is_success() => {
                    return Ok(response.json().await?);
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    let error = api_error(response).await;
                    if !self.retry.should_retry_status(status) {
                        return Err(error);
                    }
                    error
                }
                Err(e) => {
                    if !self.retry.should_retry_error(&e) {
                        tracing::error!(error = %e, "chat completion transport failure");
                        return Err(e.into());
                    }
                    RagError::Http(e)
                }
            };

            let Some(delay) = self.retry.backoff.next_delay(retries, started.elapsed()) else {
                tracing::error!(retries, error = %error, "retry budget exhausted");
                return Err(error);
            };

            tracing::warn!(retries, ?delay, error = %error, "retrying chat completion");
            tokio::time::sleep(delay).await;
            retries += 1;
        }
    }
}

async fn api_error(response: Response) -> RagError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
    RagError::Api { status, message }
}

/// Request body for `POST /v1/chat/completions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Pass-through parameters such as `top_p` or `random_seed`
    #[serde(flatten)]
    pub extra: GenerationParams,
}

/// Response body of a chat completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<ChatUsage>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if any
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|choice| choice.message.content.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,
    pub message: ChoiceMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    pub role: Role,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
