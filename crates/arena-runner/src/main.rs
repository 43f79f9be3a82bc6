//! Arena runner CLI
//!
//! List registered bot engines and play bot-vs-bot matches through the
//! dispatcher. Logs go to stderr (`RUST_LOG` controls verbosity), JSON
//! results to stdout.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arena_core::Dispatcher;
use arena_runner::{run_match, standard_registry, ArenaConfig};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "arena-runner", about = "Bot engine registry and dispatch runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every registered engine as JSON
    List,
    /// Play games between two engine keys
    Play {
        #[arg(long)]
        white: String,
        #[arg(long)]
        black: String,
        /// Number of games (overrides the config file)
        #[arg(long, short = 'g')]
        games: Option<u32>,
        /// Per-call engine budget in milliseconds (overrides the config file)
        #[arg(long)]
        budget_ms: Option<u64>,
        /// TOML config file
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = standard_registry().context("bot engine registration failed")?;

    match cli.command {
        Command::List => {
            println!("{}", serde_json::to_string_pretty(&registry.summaries())?);
        }
        Command::Play {
            white,
            black,
            games,
            budget_ms,
            config,
        } => {
            let mut config = match config {
                Some(path) => ArenaConfig::load(&path)?,
                None => ArenaConfig::default(),
            };
            if let Some(games) = games {
                config.games = games;
            }
            if budget_ms.is_some() {
                config.engine_time_budget_ms = budget_ms;
            }

            for key in [&white, &black] {
                if !registry.contains(key) {
                    warn!(key = key.as_str(), "engine is not registered, every move will be a fallback");
                }
            }

            let dispatcher = Arc::new(Dispatcher::with_config(registry, config.dispatch_config()));
            let summary = run_match(dispatcher, &config, &white, &black).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
