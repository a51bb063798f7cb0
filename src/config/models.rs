//! Model identifiers and adapter configuration

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Environment variable consulted when no API key is passed explicitly
pub const API_KEY_ENV: &str = "MISTRAL_API_KEY";

/// Default Mistral API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f64 = 0.0;

/// Default maximum output tokens
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Supported Mistral models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MistralModel {
    #[serde(rename = "pixtral-12b-2409")]
    Pixtral12b,
    #[default]
    #[serde(rename = "ministral-3b-2410")]
    Ministral3b,
}

impl MistralModel {
    /// All supported models
    pub const ALL: [Self; 2] = [Self::Pixtral12b, Self::Ministral3b];

    /// Model identifier as sent to the API
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pixtral12b => "pixtral-12b-2409",
            Self::Ministral3b => "ministral-3b-2410",
        }
    }

    /// Whether the model accepts image inputs
    #[must_use]
    pub const fn supports_images(&self) -> bool {
        matches!(self, Self::Pixtral12b)
    }
}

impl std::fmt::Display for MistralModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MistralModel {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|model| model.as_str() == s.trim())
            .ok_or_else(|| RagError::UnknownModel(s.to_string()))
    }
}

/// Resolved configuration for a language model adapter.
///
/// Immutable once built; construct through [`ModelConfig::new`] so the API
/// key is always present.
#[derive(Clone)]
pub struct ModelConfig {
    model: MistralModel,
    api_key: String,
    temperature: f64,
    max_tokens: u32,
    base_url: String,
}

impl ModelConfig {
    /// Resolve a configuration, falling back to [`API_KEY_ENV`] for the key.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::MissingApiKey`] if neither the argument nor the
    /// environment provides a non-empty key, and [`RagError::InvalidConfig`]
    /// for a zero token budget or an out-of-range temperature.
    pub fn new(
        model: MistralModel,
        api_key: Option<String>,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<Self> {
        let api_key = resolve_api_key(api_key)?;
        validate_sampling(temperature, max_tokens)?;

        Ok(Self {
            model,
            api_key,
            temperature,
            max_tokens,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the adapter at another endpoint
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub const fn model(&self) -> MistralModel {
        self.model
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub const fn temperature(&self) -> f64 {
        self.temperature
    }

    #[must_use]
    pub const fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn resolve_api_key(explicit: Option<String>) -> Result<String> {
    explicit
        .filter(|key| !key.trim().is_empty())
        .or_else(|| {
            std::env::var(API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty())
        })
        .ok_or(RagError::MissingApiKey {
            env_var: API_KEY_ENV,
        })
}

pub(crate) fn validate_sampling(temperature: f64, max_tokens: u32) -> Result<()> {
    if max_tokens == 0 {
        return Err(RagError::InvalidConfig(
            "max_tokens must be positive".to_string(),
        ));
    }
    if !temperature.is_finite() || temperature < 0.0 {
        return Err(RagError::InvalidConfig(format!(
            "temperature must be a non-negative number, got {temperature}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_identifiers_round_trip() {
        for model in MistralModel::ALL {
            assert_eq!(model.as_str().parse::<MistralModel>().unwrap(), model);
        }
        assert!(matches!(
            "gpt-4o".parse::<MistralModel>(),
            Err(RagError::UnknownModel(_))
        ));
    }

    #[test]
    fn test_model_serde_uses_api_identifier() {
        let json = serde_json::to_string(&MistralModel::Ministral3b).unwrap();
        assert_eq!(json, "\"ministral-3b-2410\"");
    }

    #[test]
    fn test_explicit_key_wins() {
        let config =
            ModelConfig::new(MistralModel::Ministral3b, Some("x".into()), 0.2, 16).unwrap();
        assert_eq!(config.api_key(), "x");
        assert!((config.temperature() - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.max_tokens(), 16);
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config =
            ModelConfig::new(MistralModel::Ministral3b, Some("sk-secret".into()), 0.0, 8).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("Ministral3b"));
    }

    #[test]
    fn test_rejects_zero_max_tokens() {
        let result = ModelConfig::new(MistralModel::Ministral3b, Some("x".into()), 0.0, 0);
        assert!(matches!(result, Err(RagError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_negative_temperature() {
        let result = ModelConfig::new(MistralModel::Pixtral12b, Some("x".into()), -0.5, 10);
        assert!(matches!(result, Err(RagError::InvalidConfig(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = ModelConfig::new(MistralModel::Ministral3b, Some("x".into()), 0.0, 8)
            .unwrap()
            .with_base_url("http://localhost:1234/");
        assert_eq!(config.base_url(), "http://localhost:1234");
    }
}
