//! HTTP API over the image cache.

pub mod routes;

use std::sync::Arc;

use crate::app::Result;
use crate::cache::{BatchServer, Refresher};

pub use routes::router;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ApiState {
    pub refresher: Arc<Refresher>,
    pub batches: BatchServer,
    pub default_batch: usize,
    /// Size of the source registry, reported by `/status`.
    pub sources: usize,
}

/// Bind `addr` and serve until SIGINT or SIGTERM.
pub async fn serve(state: ApiState, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {},
                    _ = sigint.recv() => {},
                }
            }
            _ => {
                tracing::warn!("Could not install signal handlers; falling back to ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
}
