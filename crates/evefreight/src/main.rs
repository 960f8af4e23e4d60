mod app;
mod config;
mod handlers;
mod storage;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use evefreight_auth::{AuthState, InMemorySessionRepository};
use listenfd::ListenFd;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    app::create_app,
    config::Config,
    storage::inmemory::{InMemoryAccountRepository, InMemoryEsiKeyRepository},
};

/// Slack on top of the upstream timeout before a request is cut off.
const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// eve-freight - EVE Online freight service
#[derive(Parser, Debug)]
#[command(name = "evefreight")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value = "8000", env = "PORT")]
    port: u16,

    /// Path to the JSON configuration file
    #[arg(long, short, default_value = "./config.json", env = "EVEFREIGHT_CONFIG")]
    config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long, env = "EVEFREIGHT_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_json);

    let config = Config::load(&cli.config)?;
    let auth_config = config
        .auth_config()
        .context("invalid auth configuration")?;
    let request_timeout = auth_config.upstream_timeout * 2 + REQUEST_TIMEOUT_MARGIN;

    tracing::info!(config = ?auth_config, "Loaded configuration");

    let state = AuthState::from_config(
        auth_config,
        Arc::new(InMemorySessionRepository::new()),
        Arc::new(InMemoryAccountRepository::new()),
        Arc::new(InMemoryEsiKeyRepository::new()),
    )
    .context("failed to initialize SSO")?;

    let app = create_app(state, request_timeout);

    // Auto-reload support via listenfd
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        None => {
            let addr = format!("{}:{}", cli.host, cli.port);
            TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?
        }
    };

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "evefreight=debug,evefreight_auth=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
