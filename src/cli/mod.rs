//! CLI argument parsing and command routing

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::MistralModel;

/// slides-rag: question answering backed by the Mistral API
#[derive(Debug, Parser)]
#[command(name = "slides-rag")]
#[command(about = "Question answering backed by the Mistral chat API", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Answer a question
    Ask {
        /// The question to answer
        question: String,

        /// Model identifier (overrides the settings file)
        #[arg(long, value_parser = parse_model)]
        model: Option<MistralModel>,

        /// Sampling temperature (overrides the settings file)
        #[arg(long)]
        temperature: Option<f64>,

        /// Maximum output tokens (overrides the settings file)
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Settings file to load instead of the default location
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the call history after answering
        #[arg(long)]
        history: bool,
    },

    /// Print a file as base64
    Encode {
        /// File to encode
        path: PathBuf,
    },

    /// List supported models
    Models,
}

fn parse_model(value: &str) -> Result<MistralModel, String> {
    value.parse().map_err(|e: crate::RagError| e.to_string())
}

impl Cli {
    /// Parse CLI arguments from environment
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
