//! slides-rag: question answering backed by the Mistral chat API
//!
//! The library exposes a language model adapter for the Mistral
//! chat-completion endpoint, a chain-of-thought question answering pipeline
//! built on top of it, and helpers for encoding slide images.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::too_many_lines)]

pub mod cli;
pub mod config;
pub mod error;
pub mod messages;
pub mod pipeline;
pub mod services;
pub mod utils;

// Re-exports for convenience
pub use error::{RagError, Result};
pub use pipeline::{Prediction, SlidesRag};
pub use services::{LanguageModel, MistralLm};
