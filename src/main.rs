//! slides-rag binary entry point

use color_eyre::Result;
use slides_rag::{
    cli::{Cli, Commands},
    config::{MistralModel, Settings},
    utils, LanguageModel, MistralLm, SlidesRag,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Install error handler
    color_eyre::install()?;

    // Pick up MISTRAL_API_KEY from a local .env, if any
    dotenv::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("slides_rag=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Ask {
            question,
            model,
            temperature,
            max_tokens,
            config,
            history,
        } => {
            let mut settings = match config {
                Some(path) => Settings::load_from_path(&path)?,
                None => Settings::load()?,
            };
            if let Some(model) = model {
                settings.model = model;
            }
            if let Some(temperature) = temperature {
                settings.temperature = temperature;
            }
            if let Some(max_tokens) = max_tokens {
                settings.max_tokens = max_tokens;
            }

            let lm = MistralLm::new(settings.model_config()?, settings.extra_params.clone())?;
            let mut rag = SlidesRag::new(lm);
            let prediction = rag.forward(&question).await?;

            if cli.verbose {
                if let Some(reasoning) = prediction.reasoning() {
                    println!("Reasoning: {reasoning}\n");
                }
            }
            println!("{}", prediction.answer().unwrap_or_default());

            if history {
                println!("\n{}", rag.lm().inspect_history());
            }
        }
        Commands::Encode { path } => {
            println!("{}", utils::encode_to_base64(&path)?);
        }
        Commands::Models => {
            for model in MistralModel::ALL {
                let images = if model.supports_images() { " (images)" } else { "" };
                println!("{model}{images}");
            }
        }
    }

    Ok(())
}
