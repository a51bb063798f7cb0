//! Service layer for the remote language model
//!
//! - [`client`]: HTTP transport for the Mistral chat-completion endpoint
//! - [`retry`]: backoff policy applied by the transport
//! - [`mistral`]: the adapter presenting a uniform generation contract

pub mod client;
pub mod mistral;
pub mod retry;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    messages::{Message, Prompt},
};

pub use self::{
    client::{ChatCompletionRequest, ChatCompletionResponse, MistralClient},
    mistral::MistralLm,
    retry::{BackoffStrategy, RetryConfig},
};

/// Free-form generation parameters forwarded with every request
pub type GenerationParams = serde_json::Map<String, serde_json::Value>;

/// One logged generation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    /// The bare prompt, absent when messages were supplied directly
    pub prompt: Option<String>,
    /// Messages dispatched to the endpoint
    pub messages: Vec<Message>,
    /// Parameters dispatched alongside the messages
    pub params: GenerationParams,
    /// Raw completion returned by the endpoint
    pub completion: ChatCompletionResponse,
    pub timestamp: DateTime<Utc>,
}

impl CallRecord {
    /// Text of the first completion choice
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.completion.first_text()
    }
}

impl std::fmt::Display for CallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Prompt: {} -> Completions: {}",
            self.prompt.as_deref().unwrap_or("None"),
            self.first_text().unwrap_or("None")
        )
    }
}

/// Core trait for language models driven by the pipeline
///
/// Implementations turn a prompt or a message list into generated text.
/// `generate` takes `&mut self` because a call appends to the model's
/// history.
#[async_trait]
pub trait LanguageModel: Send {
    /// Model identifier
    fn model(&self) -> &str;

    /// Generate completions for `prompt`, merging `params` over the model's
    /// defaults
    async fn generate(&mut self, prompt: Prompt, params: GenerationParams) -> Result<Vec<String>>;

    /// Calls made so far, in call order
    fn history(&self) -> &[CallRecord];

    /// Render the history as one line per call
    fn inspect_history(&self) -> String {
        self.history()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
