//! Warden CLI: the main entry point.
//!
//! Commands:
//! - `config`: Print the effective configuration (or its path)
//! - `check` : Evaluate the policy for one tool call
//! - `route` : Dry-run backend routing for a prompt

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "warden",
    about = "Warden: policy, scheduling and routing core for agent tool calls",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of ~/.warden/config.toml
    #[arg(short, long, global = true, env = "WARDEN_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration as TOML
    Config {
        /// Print the config file location instead
        #[arg(long)]
        path: bool,
    },

    /// Evaluate the policy for a tool call
    Check {
        /// Tool name
        tool: String,

        /// Tool arguments as JSON (defaults to `{}`)
        args: Option<String>,

        /// Evaluate as a session with nobody to ask
        #[arg(long)]
        non_interactive: bool,
    },

    /// Dry-run backend routing for a prompt
    Route {
        /// The request to route
        prompt: Option<String>,

        /// Earlier conversation turns, oldest first (repeatable)
        #[arg(long)]
        history: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Config { path } => commands::config_cmd::run(config, path).await?,
        Commands::Check {
            tool,
            args,
            non_interactive,
        } => commands::check::run(config, tool, args, non_interactive).await?,
        Commands::Route { prompt, history } => {
            commands::route::run(config, prompt, history).await?
        }
    }

    Ok(())
}
