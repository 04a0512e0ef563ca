//! `confab serve` — HTTP server with optional idle-session sweeping.
//!
//! Startup order:
//! 1. Validate config and build the manager (fatal on a bad API key)
//! 2. Install it in the readiness slot
//! 3. Start the idle sweeper if `session.ttlSecs` is set
//! 4. Serve until Ctrl+C

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use tracing::info;

use confab_core::config::Config;
use confab_core::session::IdleSweeper;
use confab_server::{run_server, AppState};

use crate::build_manager;

pub async fn run(config: Config) -> Result<()> {
    let state = AppState::pending();
    let manager = build_manager(&config)?;
    state.install(manager.clone());

    let sweeper = config.session.ttl_secs.map(|ttl| {
        let sweeper = Arc::new(IdleSweeper::new(
            manager.store(),
            Duration::from_secs(ttl),
            Some(Duration::from_secs(config.session.sweep_interval_secs)),
        ));
        let task = sweeper.clone();
        tokio::spawn(async move { task.start().await });
        sweeper
    });

    let addr = config.server.bind_addr();
    println!();
    println!("{}", "Confab server".cyan().bold());
    println!("  {:<12} {}", "Address:".bold(), addr);
    println!("  {:<12} {}", "Model:".bold(), manager.model());
    println!("  {:<12} {}", "History:".bold(), manager.max_history());
    if let Some(ttl) = config.session.ttl_secs {
        println!("  {:<12} {}s", "Idle TTL:".bold(), ttl);
    }
    println!();
    println!("  Ctrl+C to stop");
    println!();

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down");
        }
    };

    let result = run_server(state, &addr, shutdown).await;

    if let Some(sweeper) = sweeper {
        sweeper.stop();
    }
    println!("  Server stopped. Goodbye!");
    result
}
