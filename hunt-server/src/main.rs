use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hunt_core::{HuntEngine, HuntStore};
use hunt_persistence::{connection::connect_and_migrate_to, HuntRepository, SeaOrmHuntStore};
use hunt_server::{config::Config, create_routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting hunt server...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize database connection and run migrations
    let db = match connect_and_migrate_to(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to connect to database and run migrations: {:#}", e);
            std::process::exit(1);
        }
    };

    let store: Arc<dyn HuntStore> = Arc::new(SeaOrmHuntStore::new(db.clone()));
    let engine = HuntEngine::with_config(store, config.engine_config());
    let hunt_repository = Arc::new(HuntRepository::new(db));

    info!(
        "Check-in radius {}m, storage timeout {}ms",
        config.proximity_threshold_meters, config.storage_timeout_ms
    );
    if config.threshold_overridden() {
        warn!(
            "PROXIMITY_THRESHOLD_METERS={} overrides the standard {}m check-in radius",
            config.proximity_threshold_meters,
            hunt_core::PROXIMITY_THRESHOLD_METERS
        );
    }

    let routes = create_routes(engine, hunt_repository);

    let addr = (config.host.parse::<std::net::IpAddr>()?, config.port);
    info!("Server starting on {}:{}", config.host, config.port);

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let (Ok(mut sigint), Ok(mut sigterm)) = (
                signal::unix::signal(signal::unix::SignalKind::interrupt()),
                signal::unix::signal(signal::unix::SignalKind::terminate()),
            ) else {
                tracing::error!("Failed to install signal handlers");
                return std::future::pending::<()>().await;
            };

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            if signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl+C, shutting down gracefully...");
            }
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
    Ok(())
}
