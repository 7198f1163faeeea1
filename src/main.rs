//! accountd - Application Entry Point
//!
//! This is the main entry point for the account service.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use accountd::{
    config::{LogFormat, StorageBackend, CONFIG},
    db::{
        self,
        repositories::{SessionRepository, UserRepository},
    },
    handlers,
    services::LogMailer,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CONFIG.clone();
    config.validate()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.server.rust_log.clone().into());
    let registry = tracing_subscriber::registry().with(filter);
    match config.server.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!("Starting accountd server...");

    let state = match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; accounts are lost on restart");
            AppState::in_memory(config.clone())?
        }
        StorageBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(&config.storage).await?;
            db::test_connection(&pool).await?;

            tracing::info!("Running database migrations...");
            db::run_migrations(&pool).await?;

            tracing::info!("Connecting to Redis...");
            let redis = db::create_redis(&config.storage).await?;

            AppState::new(
                config.clone(),
                Arc::new(UserRepository::new(pool)),
                Arc::new(SessionRepository::new(redis)),
                Arc::new(LogMailer),
            )?
        }
    };

    let sweeper = state
        .tokens()
        .spawn_sweeper(Duration::from_secs(config.auth.sweep_interval_secs));

    // Build the router
    let app = handlers::router(state);

    // Start the server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(
        "Server listening on http://{}{}",
        addr,
        config.server.api_version
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
