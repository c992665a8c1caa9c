//! HTTP front-end serving the dashboard page.

pub mod page;
pub mod routes;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::dashboard::Dashboard;
use crate::fetch::HttpClient;

pub use routes::router;

/// Binds `bind_addr` and serves the dashboard until the process stops.
pub async fn run_server<C: HttpClient + 'static>(
    bind_addr: &str,
    dashboard: Arc<Dashboard<C>>,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "Dashboard listening on http://{bind_addr}");

    axum::serve(listener, router(dashboard))
        .await
        .context("server error")?;
    Ok(())
}
