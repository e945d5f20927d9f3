//! Sigma account API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod middleware;
mod response;
mod state;

use sigma_core::AppError;
use tracing::info;

use crate::api_config::{ApiConfig, StorageBackend, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let app_state = match &config.storage {
        StorageBackend::Memory => api_services::build_memory_state(&config)?,
        StorageBackend::Postgres { database_url } => {
            let pool = api_services::connect_and_migrate(database_url).await?;
            if config.migrate_only {
                info!("database migrations applied successfully");
                return Ok(());
            }
            api_services::build_postgres_state(pool, &config)
        }
    };

    let app = api_router::build_router(app_state, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind API listener: {error}")))?;

    info!(%address, storage = config.storage.label(), "sigma api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("API server failed: {error}")))
}
