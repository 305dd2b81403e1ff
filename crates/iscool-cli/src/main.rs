//! IsCool CLI — entry point.
//!
//! # Commands
//!
//! - `iscool ask <QUESTION> [PROVIDERS...]` — one question, fan-out or fusion
//! - `iscool chat [--providers a,b]` — interactive REPL
//! - `iscool status` — show configuration and provider status
//! - `iscool onboard` — write a default config

mod helpers;
mod onboard;
mod repl;
mod status;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use iscool_aggregator::{AggregateError, Aggregator};
use iscool_core::config::load_config;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// IsCool — ask several LLMs at once, or fuse two answers into one
#[derive(Parser)]
#[command(name = "iscool", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question
    Ask {
        /// The question to send
        question: String,

        /// Providers to ask (e.g. gemini openai). Defaults to fusion.
        providers: Vec<String>,

        /// Print the full response as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Interactive question loop
    Chat {
        /// Comma-separated providers (e.g. "gemini,deepseek"). Defaults to fusion.
        #[arg(short, long)]
        providers: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Show configuration and provider status
    Status,

    /// Initialize configuration
    Onboard,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ask {
            question,
            providers,
            json,
            logs,
        } => {
            init_logging(logs);
            run_ask(question, providers, json).await
        }
        Commands::Chat { providers, logs } => {
            init_logging(logs);
            let aggregator = build_aggregator();
            let providers = helpers::parse_provider_list(providers.as_deref().unwrap_or(""));
            repl::run(aggregator, providers).await
        }
        Commands::Status => status::run(),
        Commands::Onboard => onboard::run(),
    }
}

// ─────────────────────────────────────────────
// Ask command
// ─────────────────────────────────────────────

async fn run_ask(question: String, providers: Vec<String>, json: bool) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        anyhow::bail!("question must not be empty");
    }

    let aggregator = build_aggregator();
    let providers = helpers::default_providers(providers);

    info!(providers = ?providers, "asking");
    let response = aggregator
        .aggregate(question, &providers)
        .await
        .map_err(|e| explain(&aggregator, e))?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&response).context("failed to serialize response")?;
        println!("{rendered}");
    } else {
        helpers::print_response(&response);
    }

    Ok(())
}

/// Build the aggregator from `~/.iscool/config.json` + environment.
fn build_aggregator() -> Aggregator {
    let config = load_config(None);
    Aggregator::from_config(&config)
}

/// Attach the list of valid identifiers to a failed request.
fn explain(aggregator: &Aggregator, err: AggregateError) -> anyhow::Error {
    let known = helpers::known_providers(aggregator.registry());
    anyhow::anyhow!("{err}; known providers: {}", known.join(", "))
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("iscool=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
