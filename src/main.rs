use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use catalog_api::config::{self, AppConfig, StorageBackend};
use catalog_api::database::models::{Product, User};
use catalog_api::database::DatabaseManager;
use catalog_api::state::AppState;

#[derive(Parser)]
#[command(name = "catalog-api", version, about = "User and product catalog REST service")]
struct Cli {
    /// Interface to bind (overrides SERVER_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides SERVER_PORT / PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Document storage backend (overrides STORAGE_BACKEND)
    #[arg(long, value_enum)]
    storage: Option<StorageBackend>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, STORAGE_BACKEND, etc.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config: AppConfig = config::config().clone();
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(storage) = cli.storage {
        config.storage.backend = storage;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.default_log_filter())),
        )
        .init();
    info!("Starting catalog API in {:?} mode", config.environment);

    let (state, manager) = match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on exit");
            (AppState::in_memory(), None)
        }
        StorageBackend::Postgres => {
            let manager = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to database")?;
            manager.health_check().await.context("database health check failed")?;
            manager.ensure_collection::<User>().await?;
            manager.ensure_collection::<Product>().await?;
            (AppState::postgres(&manager), Some(manager))
        }
    };

    let app = catalog_api::app(state, &config);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Catalog API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(manager) = manager {
        manager.close().await;
    }
    info!("Catalog API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
