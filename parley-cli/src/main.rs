//! Parley CLI - replay player chat against an LLM-backed NPC

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use parley_cli::bridge;
use parley_cli::config::{self, Overrides};
use parley_cli::runner;
use parley_core::types::Mood;

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Replay player chat messages against an NPC", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a batch of player messages and write the transcript
    Run(RunArgs),
    /// Print the prompt that would be sent for one message
    Prompt(PromptArgs),
    /// Version information
    Version,
}

#[derive(Args)]
struct RunArgs {
    /// JSON array of {player_id, text, timestamp} records
    #[arg(short, long, default_value = "players.json")]
    input: PathBuf,

    /// Transcript destination (overwritten)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML config file (defaults to ./parley.toml when present)
    #[arg(short, long, env = "PARLEY_CONFIG")]
    config: Option<PathBuf>,

    /// Model name
    #[arg(long, env = "PARLEY_MODEL")]
    model: Option<String>,

    /// Backend base URL
    #[arg(long, env = "PARLEY_BASE_URL")]
    base_url: Option<String>,

    /// Backend: ollama, openai or none
    #[arg(long, env = "PARLEY_PROVIDER")]
    provider: Option<String>,

    /// Skip the console report
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Args)]
struct PromptArgs {
    /// Speaking player
    #[arg(long)]
    player_id: i64,

    /// Mood label: neutral, friendly or angry
    #[arg(long, default_value = "neutral")]
    mood: Mood,

    /// The new message
    #[arg(long)]
    message: String,

    /// An earlier message, oldest first; repeatable
    #[arg(long)]
    history: Vec<String>,

    /// TOML config file (for `llm.prompt_file`)
    #[arg(short, long, env = "PARLEY_CONFIG")]
    config: Option<PathBuf>,
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            println!("parley {}", env!("CARGO_PKG_VERSION"));
            println!("parley-core {}", parley_core::VERSION);
        }
        Commands::Run(args) => {
            let overrides = Overrides {
                provider: args.provider,
                base_url: args.base_url,
                model: args.model,
                output: args.output,
                quiet: args.quiet,
            };
            let config = config::resolve(args.config.as_deref(), &overrides)?;
            init_tracing(&config.general.log_level);

            let console = config.transcript.console.then(std::io::stdout);
            runner::run(&config, &args.input, console).await?;
        }
        Commands::Prompt(args) => {
            let config = config::resolve(args.config.as_deref(), &Overrides::default())?;
            init_tracing(&config.general.log_level);

            let prompt = bridge::load_prompt(&config.llm).context("loading prompt templates")?;
            let start = args.history.len().saturating_sub(config.session.history_window);
            let (system, user) = prompt.render(
                &args.player_id.to_string(),
                args.mood.as_str(),
                &args.history[start..],
                &args.message,
            );
            println!("[system]\n{system}\n\n[user]\n{user}");
        }
    }

    Ok(())
}
