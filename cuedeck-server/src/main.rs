//! cuedeck-server - sound cue organizer backend
//!
//! Serves the version/scene/track tree under the music root over HTTP
//! and streams audio to the browser.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cuedeck_common::config::{load_toml_config, Overrides, ServerConfig};
use cuedeck_server::{build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for cuedeck-server
#[derive(Parser, Debug)]
#[command(name = "cuedeck-server")]
#[command(about = "Sound cue organizer for theatre productions")]
#[command(version)]
struct Args {
    /// Directory holding `base` and `ver<N>` snapshots
    #[arg(short, long, env = "CUEDECK_MUSIC_ROOT")]
    music_root: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "CUEDECK_BIND_ADDRESS")]
    bind_address: Option<String>,

    /// TOML config file (default: ~/.config/cuedeck/config.toml)
    #[arg(short, long, env = "CUEDECK_CONFIG")]
    config: Option<PathBuf>,

    /// Track description CSV
    #[arg(long, env = "CUEDECK_DESCRIPTIONS_CSV")]
    descriptions_csv: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CUEDECK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Login username
    #[arg(long, env = "USERNAME", hide_env_values = true)]
    username: Option<String>,

    /// Login password
    #[arg(long, env = "PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Secret used to sign session cookies
    #[arg(long, env = "SESSION_SECRET", hide_env_values = true)]
    session_secret: Option<String>,

    /// Deployment environment; `production` marks cookies Secure
    #[arg(long, env = "CUEDECK_ENV")]
    environment: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml = load_toml_config(args.config.as_deref()).context("Failed to load config file")?;
    let overrides = Overrides {
        music_root: args.music_root,
        port: args.port,
        bind_address: args.bind_address,
        descriptions_csv: args.descriptions_csv,
        log_level: args.log_level,
        username: args.username,
        password: args.password,
        session_secret: args.session_secret,
        environment: args.environment.or_else(|| std::env::var("NODE_ENV").ok()),
    };
    let config = ServerConfig::resolve(overrides, toml).context("Invalid configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting cuedeck-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Music root: {}", config.music_root.display());

    let state = AppState::from_config(&config);
    state
        .store
        .ensure_layout()
        .with_context(|| format!("Failed to prepare {}", config.music_root.display()))?;

    let app = build_router(state);

    let ip = config
        .bind_address
        .parse::<std::net::IpAddr>()
        .with_context(|| format!("Invalid bind address: {}", config.bind_address))?;
    let addr = SocketAddr::new(ip, config.port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("cuedeck-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
