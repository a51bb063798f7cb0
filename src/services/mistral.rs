//! Mistral language model adapter
//!
//! Wraps [`MistralClient`] behind the [`LanguageModel`] contract. The
//! adapter owns the default parameter map and an append-only call history;
//! retries happen inside the client transport.

use async_trait::async_trait;
use chrono::Utc;

use super::{
    client::{ChatCompletionRequest, MistralClient},
    retry::RetryConfig,
    CallRecord, GenerationParams, LanguageModel,
};
use crate::{
    config::models::ModelConfig,
    error::{RagError, Result},
    messages::Prompt,
};

/// Parameters the adapter always controls itself
const RESERVED_PARAMS: [&str; 2] = ["model", "messages"];

/// Language model backed by the Mistral chat-completion API
#[derive(Debug)]
pub struct MistralLm {
    client: MistralClient,
    config: ModelConfig,
    defaults: GenerationParams,
    history: Vec<CallRecord>,
}

impl MistralLm {
    /// Create an adapter from a resolved configuration
    ///
    /// `defaults` are merged into every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: ModelConfig, defaults: GenerationParams) -> Result<Self> {
        let client = MistralClient::new(
            config.api_key(),
            config.base_url(),
            RetryConfig::adapter_default(),
        )?;

        tracing::debug!(model = %config.model(), base_url = config.base_url(), "initialized Mistral adapter");

        Ok(Self {
            client,
            config,
            defaults,
            history: Vec::new(),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &ModelConfig {
        &self.config
    }

    #[must_use]
    pub const fn default_params(&self) -> &GenerationParams {
        &self.defaults
    }

    /// Build the request for `prompt`.
    ///
    /// Caller parameters override the adapter defaults, but `temperature` and
    /// `max_tokens` are always the configured values.
    fn build_request(&self, prompt: Prompt, params: GenerationParams) -> Result<ChatCompletionRequest> {
        let messages = prompt.into_messages();
        if messages.is_empty() {
            return Err(RagError::InvalidInput(
                "a prompt or at least one message is required".to_string(),
            ));
        }

        let mut extra = self.defaults.clone();
        extra.extend(params);

        for key in RESERVED_PARAMS {
            if extra.remove(key).is_some() {
                tracing::warn!(param = key, "ignoring generation parameter owned by the adapter");
            }
        }
        // Forced below through the typed fields.
        extra.remove("temperature");
        extra.remove("max_tokens");

        Ok(ChatCompletionRequest {
            model: self.config.model().as_str().to_string(),
            messages,
            temperature: self.config.temperature(),
            max_tokens: self.config.max_tokens(),
            extra,
        })
    }
}

#[async_trait]
impl LanguageModel for MistralLm {
    fn model(&self) -> &str {
        self.config.model().as_str()
    }

    async fn generate(&mut self, prompt: Prompt, params: GenerationParams) -> Result<Vec<String>> {
        let prompt_text = prompt.text().map(str::to_string);
        let request = self.build_request(prompt, params)?;

        let completion = self.client.chat_complete(&request).await?;

        let text = completion
            .first_text()
            .ok_or_else(|| RagError::NoCompletion {
                model: request.model.clone(),
            })?
            .to_string();

        let mut params = request.extra;
        params.insert("temperature".into(), request.temperature.into());
        params.insert("max_tokens".into(), request.max_tokens.into());

        self.history.push(CallRecord {
            prompt: prompt_text,
            messages: request.messages,
            params,
            completion,
            timestamp: Utc::now(),
        });

        Ok(vec![text])
    }

    fn history(&self) -> &[CallRecord] {
        &self.history
    }
}
