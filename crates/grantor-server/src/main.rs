use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use grantor_server::{ServerConfig, build_app, build_state, spawn_expiry_sweeper};

/// OAuth 2.0 authorization server (RFC 6749).
#[derive(Debug, Parser)]
#[command(name = "grantor-server", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "GRANTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address override, e.g. 0.0.0.0:9000.
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ServerConfig::load(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.listen = listen;
    }

    let (state, store) = build_state(&config);
    let app = build_app(state);
    let sweeper = spawn_expiry_sweeper(store, config.expiry_sweep_interval);

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!(
        addr = %config.listen,
        demo_data = config.seed_demo_data,
        "authorization server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
