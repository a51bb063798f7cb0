//! Error types for slides-rag

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`RagError`]
pub type Result<T> = std::result::Result<T, RagError>;

/// Main error type for slides-rag
#[derive(Debug, Error)]
pub enum RagError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No API key passed explicitly and none found in the environment
    #[error("The {env_var} API key is not set and not provided")]
    MissingApiKey { env_var: &'static str },

    /// Configuration parse error
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Configuration validation error
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Model identifier outside the supported set
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Upstream API answered with a non-success status
    #[error("API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The completion response carried no choices
    #[error("Completion response from {model} contained no choices")]
    NoCompletion { model: String },

    /// Model output did not contain the expected fields
    #[error("Failed to parse model output: {0}")]
    Parse(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

impl RagError {
    /// Whether this error came from the remote completion endpoint
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::Http(_))
    }
}
