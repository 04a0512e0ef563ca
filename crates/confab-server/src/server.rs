//! Listener and graceful shutdown.

use std::future::Future;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::routes::build_router;
use crate::state::AppState;

/// Bind `addr` and serve until `shutdown` resolves.
pub async fn run_server<F>(state: AppState, addr: &str, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local = listener.local_addr().context("listener has no local address")?;
    info!(addr = %local, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("shutdown signal received");
        })
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}
