//! LiteLLM local proxy
//!
//! Entry point: loads `.auth.env`, refuses to start without credentials,
//! then serves on the loopback interface until interrupted.

use anyhow::Result;
use tokio::signal;
use tracing::{error, info, warn};

use litellm_local_proxy::{run, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "litellm_local_proxy=info,tower_http=info".into()),
        )
        .with_target(true)
        .init();

    info!("Starting LiteLLM local proxy");

    // Load configuration
    let config = Config::load()?;
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration, refusing to start");
        std::process::exit(1);
    }
    info!("Configuration loaded successfully");

    run(config, shutdown_signal()).await?;

    info!("Proxy stopped");
    Ok(())
}

/// Handle graceful shutdown signals
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            warn!("Received SIGTERM, shutting down");
        }
    }
}
