//! LiteLLM local proxy
//!
//! A loopback-only HTTP proxy that forwards POST requests to a LiteLLM
//! server, injecting the user's authentication headers on the way. It lets
//! clients that only accept a base URL talk to a gated upstream.

pub mod config;
pub mod error;
pub mod proxy;
pub mod routes;

use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

pub use crate::config::Config;
pub use crate::error::{AppError, AppResult};
pub use crate::proxy::Forwarder;

/// Application state shared across all request handlers
///
/// Read-only after construction; no locking is involved.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub forwarder: Forwarder,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_seconds))
            .build()
            .context("Failed to build HTTP client")?;

        let forwarder = Forwarder::new(http_client, &config)?;

        Ok(Self { config, forwarder })
    }
}

/// Validate the configuration, bind the loopback port and serve until
/// `shutdown` resolves
///
/// Credentials are checked before any socket is bound.
pub async fn run<F>(config: Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    config.validate()?;
    let state = Arc::new(AppState::new(config)?);

    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, state.config.listen_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on http://{}", addr);
    info!(target_url = %state.forwarder.base_url(), "Forwarding to upstream");
    info!(user_email = %state.config.user_email, "Injecting credentials");

    serve(listener, state, shutdown).await
}

/// Serve the proxy on an already-bound listener
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = routes::create_router(state);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .context("Server error")?;

    Ok(())
}
