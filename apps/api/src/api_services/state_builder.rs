use std::sync::Arc;

use sigma_application::{AccountService, AuditRecorder, AuthorizationService};
use sigma_core::AppError;
use sigma_infrastructure::{
    InMemoryAccountRepository, InMemoryAuditRepository, InMemoryAuthorizationRepository,
    PostgresAccountRepository, PostgresAuditRepository, PostgresAuthorizationRepository,
    StaticMessageCatalog,
};
use sqlx::PgPool;
use tracing::warn;

use crate::api_config::ApiConfig;
use crate::state::AppState;

/// Wires every port to process-local storage. Grants come from `ACCESS_GRANTS`.
pub fn build_memory_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let grants = InMemoryAuthorizationRepository::parse(&config.access_grants)?;
    if config.access_grants.trim().is_empty() {
        warn!("ACCESS_GRANTS is empty; every account request will be forbidden");
    }

    Ok(AppState {
        account_service: AccountService::new(Arc::new(InMemoryAccountRepository::new())),
        authorization_service: AuthorizationService::new(Arc::new(grants)),
        audit_recorder: AuditRecorder::new(Arc::new(InMemoryAuditRepository::new())),
        messages: Arc::new(StaticMessageCatalog::new()),
        default_language: config.default_language.clone(),
    })
}

pub fn build_postgres_state(pool: PgPool, config: &ApiConfig) -> AppState {
    AppState {
        account_service: AccountService::new(Arc::new(PostgresAccountRepository::new(
            pool.clone(),
        ))),
        authorization_service: AuthorizationService::new(Arc::new(
            PostgresAuthorizationRepository::new(pool.clone()),
        )),
        audit_recorder: AuditRecorder::new(Arc::new(PostgresAuditRepository::new(pool))),
        messages: Arc::new(StaticMessageCatalog::new()),
        default_language: config.default_language.clone(),
    }
}
