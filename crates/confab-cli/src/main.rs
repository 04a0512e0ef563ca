//! Confab CLI — entry point.
//!
//! # Commands
//!
//! - `confab chat [-m MESSAGE] [-s SESSION]` — single-shot or interactive REPL
//! - `confab serve [--host HOST] [--port PORT]` — HTTP server
//! - `confab status` — show configuration and API key state

mod helpers;
mod repl;
mod serve;
mod status;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use confab_agent::ConversationManager;
use confab_core::config::{load_config, Config};
use confab_providers::HttpProvider;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Confab — a conversational agent over an OpenAI-compatible API
#[derive(Parser)]
#[command(name = "confab", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.confab/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat in the terminal (single-shot or interactive REPL)
    Chat {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Session identifier
        #[arg(short, long, default_value = "default")]
        session: String,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Serve the HTTP API
    Serve {
        /// Bind host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides config)
        #[arg(long)]
        port: Option<u16>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Show configuration and API key status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Chat {
            message,
            session,
            logs,
        } => {
            init_logging(logs, "warn");
            let config = read_config(config_path)?;
            run_chat(&config, message, &session).await
        }
        Commands::Serve { host, port, logs } => {
            init_logging(logs, "info");
            let mut config = read_config(config_path)?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve::run(config).await
        }
        Commands::Status => {
            let config = read_config(config_path)?;
            status::run(&config, config_path);
            Ok(())
        }
    }
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

async fn run_chat(config: &Config, message: Option<String>, session_id: &str) -> Result<()> {
    let manager = build_manager(config)?;

    match message {
        Some(msg) => {
            info!(session = %session_id, "processing single message");
            let reply = manager
                .send_message(session_id, &msg)
                .await
                .unwrap_or_else(|e| e.reply_text());
            helpers::print_response(&reply);
        }
        None => repl::run(&manager, session_id).await?,
    }

    Ok(())
}

fn read_config(path: Option<&Path>) -> Result<Config> {
    load_config(path).context("failed to load configuration")
}

/// Validate the configuration and build the shared manager.
///
/// A missing or placeholder API key is fatal here, before any traffic.
pub fn build_manager(config: &Config) -> Result<Arc<ConversationManager>> {
    config.validate().context("invalid configuration")?;

    let provider = HttpProvider::new(&config.provider).context("failed to build HTTP client")?;
    let manager = ConversationManager::from_config(config, Arc::new(provider));
    Ok(Arc::new(manager))
}

/// Initialize tracing/logging.
///
/// `--logs` forces debug output for the confab crates; otherwise `RUST_LOG`
/// wins, falling back to `default_level`.
fn init_logging(verbose: bool, default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("confab=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
