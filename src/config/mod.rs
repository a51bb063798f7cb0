//! Configuration management for slides-rag
//!
//! Values are layered, later entries winning:
//! 1. Built-in defaults
//! 2. Settings file (`<config_dir>/slides-rag/config.json` or `--config`)
//! 3. Environment variables (`MISTRAL_API_KEY`, optionally from `.env`)
//! 4. CLI parameters

pub mod models;
pub mod settings;

use std::path::PathBuf;

pub use self::{
    models::{MistralModel, ModelConfig, API_KEY_ENV},
    settings::Settings,
};

/// Get the configuration directory path
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("slides-rag")
}

/// Get the settings file path
#[must_use]
pub fn settings_path() -> PathBuf {
    config_dir().join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_paths() {
        assert!(settings_path().ends_with("slides-rag/config.json"));
    }
}
