//! File-backed settings (stored in `<config_dir>/slides-rag/config.json`)

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use super::models::{
    validate_sampling, MistralModel, ModelConfig, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE,
};
use crate::{
    error::{RagError, Result},
    services::GenerationParams,
};

/// Persisted adapter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Model to query
    #[serde(default)]
    pub model: MistralModel,

    /// Sampling temperature forced onto every call
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Output token budget forced onto every call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// API endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key; the environment is consulted when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Extra generation parameters sent with every request
    #[serde(default, skip_serializing_if = "GenerationParams::is_empty")]
    pub extra_params: GenerationParams,
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: MistralModel::default(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            base_url: default_base_url(),
            api_key: None,
            extra_params: GenerationParams::new(),
        }
    }
}

impl Settings {
    /// Load settings from the default location
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load() -> Result<Self> {
        Self::load_from_path(&super::settings_path())
    }

    /// Load settings from a specific path, using defaults when it is missing
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or holds
    /// out-of-range values
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| RagError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let settings: Self =
            serde_json::from_str(&contents).map_err(|e| RagError::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        validate_sampling(settings.temperature, settings.max_tokens)?;
        Ok(settings)
    }

    /// Resolve into an adapter configuration
    ///
    /// # Errors
    ///
    /// Returns [`RagError::MissingApiKey`] when no key is configured or set
    /// in the environment
    pub fn model_config(&self) -> Result<ModelConfig> {
        Ok(ModelConfig::new(
            self.model,
            self.api_key.clone(),
            self.temperature,
            self.max_tokens,
        )?
        .with_base_url(&self.base_url))
    }
}
