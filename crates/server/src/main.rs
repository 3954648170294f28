use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orderflow_core::{
    load_config, validate_config, FulfillmentClient, InMemoryEntityLock, InMemoryOrderStore,
    LockCoordinator, OrderOrchestrator, OrderStore, RestFulfillmentClient, SqliteOrderStore,
    StoreBackend,
};
use orderflow_server::api::create_router;
use orderflow_server::state::AppState;

/// Environment variable naming the config file
const CONFIG_ENV: &str = "ORDERFLOW_CONFIG";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");

    // Create order store
    let store: Arc<dyn OrderStore> = match config.database.backend {
        StoreBackend::Memory => {
            info!("Using in-memory order store");
            Arc::new(InMemoryOrderStore::new())
        }
        StoreBackend::Sqlite => {
            info!("Using SQLite order store at {:?}", config.database.path);
            Arc::new(
                SqliteOrderStore::new(&config.database.path)
                    .context("Failed to create order store")?,
            )
        }
    };

    // Create fulfillment client
    let fulfillment: Arc<dyn FulfillmentClient> = Arc::new(
        RestFulfillmentClient::new(&config.fulfillment)
            .context("Failed to create fulfillment client")?,
    );
    info!("Fulfillment requests go to {}", config.fulfillment.url);

    // Create orchestrator
    let locks = LockCoordinator::new(Arc::new(InMemoryEntityLock::new()), config.lock.clone());
    let orchestrator = Arc::new(OrderOrchestrator::new(
        config.lifecycle.clone(),
        store,
        locks,
        fulfillment,
    ));
    info!(
        "Order orchestrator ready ({} fulfillment attempts, lock timeout {}ms)",
        config.lifecycle.fulfillment_attempts, config.lock.timeout_ms
    );

    // Create app state and router
    let state = Arc::new(AppState::new(config.clone(), orchestrator));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
