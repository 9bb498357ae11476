//! vidsync - main entry point
//!
//! Wires the persistent store, queue engine, fan-out broadcaster, and
//! HTTP/WebSocket boundary together and runs the server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidsync::api::{self, AppContext};
use vidsync::broadcast::Broadcaster;
use vidsync::config::Config;
use vidsync::db::{init, writer::StoreWriter};
use vidsync::engine::QueueEngine;
use vidsync::resolver::CatalogResolver;

/// Command-line arguments for vidsync
#[derive(Parser, Debug)]
#[command(name = "vidsync")]
#[command(about = "Shared video queue synchronizer")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "VIDSYNC_PORT")]
    port: Option<u16>,

    /// SQLite database file
    #[arg(short, long, env = "VIDSYNC_DATABASE")]
    database: Option<PathBuf>,

    /// External metadata catalog base URL
    #[arg(long, env = "VIDSYNC_CATALOG_URL")]
    catalog_url: Option<String>,

    /// Assume the current item finished after this many seconds
    /// (0 disables the timer)
    #[arg(long, env = "VIDSYNC_AUTO_ADVANCE_SECS")]
    auto_advance_secs: Option<u64>,

    /// TOML configuration file
    #[arg(short, long, env = "VIDSYNC_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vidsync=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::resolve(
        args.config.as_deref(),
        args.port,
        args.database,
        args.catalog_url,
        args.auto_advance_secs,
    )
    .context("Failed to resolve configuration")?;

    info!("starting vidsync on port {}", config.port);
    info!("database: {}", config.database.display());

    let db_pool = SqlitePoolOptions::new()
        .connect(&config.database_url())
        .await
        .context("Failed to open database")?;
    init::initialize_database(&db_pool)
        .await
        .context("Failed to initialize database")?;

    let broadcaster = Broadcaster::new(100);
    let store = StoreWriter::spawn(db_pool.clone());
    let engine = QueueEngine::new(
        broadcaster.clone(),
        store.clone(),
        config.auto_advance_secs,
    );
    engine.load(&db_pool).await;
    info!("queue engine initialized");

    let ctx = AppContext {
        engine,
        broadcaster,
        db_pool,
        resolver: Arc::new(CatalogResolver::new(config.catalog_base_url.clone())),
        port: config.port,
    };
    let app = api::create_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Let any queued store writes land before exiting.
    store.flush().await;

    info!("server shutdown complete");
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
            info!("received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("received terminate signal, shutting down");
        },
    }
}
