//! aguadatos-api - Plant record-keeping service
//!
//! Registers water-treatment plants, their chemical-dosing configurations
//! and plant operators over a JSON HTTP API backed by SQLite.

use std::path::PathBuf;

use aguadatos_common::config::{load_config_file, FileConfig, Overrides, Settings};
use aguadatos_common::db::init::init_database;
use aguadatos_api::{build_router, AppState};
use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for aguadatos-api
#[derive(Parser, Debug)]
#[command(name = "aguadatos-api")]
#[command(about = "Plant, configuration and operator records for water-treatment plants")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "AGUADATOS_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "AGUADATOS_HOST")]
    host: Option<String>,

    /// SQLite database URL or file path
    #[arg(short, long, env = "AGUADATOS_DATABASE_URL")]
    database: Option<String>,

    /// TOML config file
    #[arg(short, long, env = "AGUADATOS_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(long, env = "AGUADATOS_DEBUG", value_parser = clap::builder::FalseyValueParser::new())]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let file_config = match &args.config {
        Some(path) => load_config_file(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => FileConfig::default(),
    };

    let settings = Settings::resolve(
        Overrides {
            host: args.host,
            port: args.port,
            database: args.database,
            debug: args.debug,
        },
        file_config,
    );

    let default_filter = if settings.debug {
        "aguadatos_api=debug,aguadatos_common=debug,tower_http=debug"
    } else {
        "aguadatos_api=info,aguadatos_common=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting AguaDatos API v{}", env!("CARGO_PKG_VERSION"));
    info!("Database: {}", settings.database);

    let pool = init_database(&settings.database)
        .await
        .context("Failed to initialize database")?;

    let app = build_router(AppState::new(pool.clone()));

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("aguadatos-api listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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
