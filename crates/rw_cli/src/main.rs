use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use rw_core::Tone;
use rw_inference::{create_model, Config, GenerationModel, Provider, QuoteRule};
use rw_web::{AppState, FormController};
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Turn raw text into a structured journalistic article",
    long_about = None
)]
pub struct Cli {
    /// Generation provider: gemini (default), vertex, openai or dummy
    #[arg(long, env = "RW_PROVIDER", default_value = "gemini")]
    provider: Provider,
    /// Model name, overriding the provider default
    #[arg(long, env = "RW_MODEL")]
    model: Option<String>,
    /// Base URL of the provider API, for proxies and compatible endpoints
    #[arg(long, env = "RW_BASE_URL")]
    base_url: Option<String>,
    /// How quotations in «guillemets» are handled: strict, brief or off
    #[arg(long, env = "RW_QUOTE_RULE")]
    quote_rule: Option<QuoteRule>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Generate one article and print it
    Generate {
        /// Tone identifier (see `rw tones`); unknown values fall back to informatif
        #[arg(long)]
        tone: Option<String>,
        /// Read the raw text from a file instead of the command line or stdin
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Print the article as JSON instead of the copy layout
        #[arg(long)]
        json: bool,
        text: Option<String>,
    },
    /// Serve the web form
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: String,
    },
    /// List the available tones
    Tones,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn read_input(text: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()));
    }
    let mut buffer = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buffer)
        .await
        .context("Failed to read stdin")?;
    Ok(buffer)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let Cli {
        provider,
        model,
        base_url,
        quote_rule,
        command,
    } = Cli::parse();

    // A missing credential aborts before the server binds or any text is read.
    let build_model = || -> anyhow::Result<Arc<dyn GenerationModel>> {
        let config = Config::from_env(provider)?
            .with_model(model.clone())
            .with_base_url(base_url.clone())
            .with_quote_rule(quote_rule);
        let model = create_model(&config)?;
        info!("🧠 Generation model initialized (using {})", model.name());
        Ok(model)
    };

    match command {
        Commands::Tones => {
            for tone in Tone::ALL {
                println!("{:<12} {}", tone.id(), tone.description());
            }
        }
        Commands::Serve { bind } => {
            let state = AppState::new(build_model()?);
            rw_web::serve(state, &bind).await?;
        }
        Commands::Generate {
            tone,
            file,
            json,
            text,
        } => {
            let model = build_model()?;
            let raw_text = read_input(text, file).await?;
            if let Some(tone) = tone.as_deref() {
                if tone.parse::<Tone>().is_err() {
                    warn!("Unknown tone '{}', using {}", tone, Tone::default());
                }
            }

            let controller = FormController::new(model);
            info!("✍️ Generating article from {} characters", raw_text.chars().count());
            let article = controller.generate(&raw_text, tone.as_deref()).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&article)?);
            } else {
                println!("{}", article.to_plain_text());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_arguments() {
        let cli = Cli::try_parse_from([
            "rw",
            "--provider",
            "dummy",
            "--quote-rule",
            "brief",
            "generate",
            "--tone",
            "narratif",
            "Le maire a parlé.",
        ])
        .unwrap();
        assert_eq!(cli.provider, Provider::Dummy);
        assert_eq!(cli.quote_rule, Some(QuoteRule::Brief));
        match cli.command {
            Commands::Generate { tone, text, json, file } => {
                assert_eq!(tone.as_deref(), Some("narratif"));
                assert_eq!(text.as_deref(), Some("Le maire a parlé."));
                assert!(!json);
                assert!(file.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_file_conflicts_with_text() {
        let result = Cli::try_parse_from(["rw", "generate", "--file", "in.txt", "texte"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        assert!(Cli::try_parse_from(["rw", "--provider", "mistral", "tones"]).is_err());
    }

    #[tokio::test]
    async fn test_read_input_prefers_argument() {
        let text = read_input(Some("Bonjour".to_string()), None).await.unwrap();
        assert_eq!(text, "Bonjour");
    }
}
