//! HTTP listener. Serves no routes: every request gets `404 Not Found`.

use anyhow::Context;
use axum::Router;
use log::{info, warn};
use tokio::net::TcpListener;

pub fn router() -> Router {
    Router::new()
}

/// Binds `0.0.0.0:port` and serves until Ctrl-C.
pub async fn serve(port: u16) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind HTTP listener on port {port}"))?;
    let addr = listener.local_addr()?;
    info!(
        "event=http_listen module=cli status=ok addr={} url=http://localhost:{}/",
        addr,
        addr.port()
    );

    axum::serve(listener, router())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP listener failed")?;

    info!("event=http_listen module=cli status=stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("event=shutdown_signal module=cli status=error error={err}");
    }
}
