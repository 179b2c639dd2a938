use actix_web::middleware::from_fn;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod domain;
mod metrics;
mod store;

use api::AppState;
use config::AppConfig;
use store::{InMemoryRepository, PostgresRepository, Repository};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging, overridable with RUST_LOG
    // Example: RUST_LOG=accounts_service=trace cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,accounts_service=debug"))
        )
        .init();

    tracing::info!("Starting accounts service");

    // === 1. Configuration ===
    let config = Arc::new(AppConfig::load()?);
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        storage = if config.database.is_memory() { "memory" } else { "postgres" },
        "Configuration loaded"
    );

    // === 2. Prometheus metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!("Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 3. Storage ===
    let repository: Arc<dyn Repository> = if config.database.is_memory() {
        tracing::warn!("Using in-memory storage, data will not survive a restart");
        Arc::new(InMemoryRepository::new())
    } else {
        let postgres = PostgresRepository::connect(&config.database).await?;
        postgres.migrate().await?;
        Arc::new(postgres)
    };

    // === 4. HTTP server ===
    let state = web::Data::new(AppState::new(repository, config.clone(), metrics));
    let bind = (config.server.host.clone(), config.server.port);

    tracing::info!("Listening on http://{}:{}", bind.0, bind.1);
    tracing::info!("   - POST   /api/create");
    tracing::info!("   - GET    /api/fetch?mobileNumber=");
    tracing::info!("   - PUT    /api/update");
    tracing::info!("   - DELETE /api/delete?mobileNumber=");
    tracing::info!("   - GET    /health, /metrics");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(from_fn(api::middleware::request_tracing))
            .configure(api::configure)
    })
    .bind(bind)?
    .run()
    .await?;

    tracing::info!("Accounts service stopped");
    Ok(())
}
