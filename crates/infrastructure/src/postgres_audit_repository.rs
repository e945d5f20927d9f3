use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use sigma_application::{AuditEvent, AuditRepository};
use sigma_core::{AppError, AppResult};

/// PostgreSQL-backed append-only audit repository.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn snapshot_text(snapshot: Option<&Value>) -> Option<String> {
    snapshot.map(Value::to_string)
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_events (
                tenant_id,
                subject,
                action,
                resource_type,
                resource_id,
                before_state,
                after_state,
                occurred_at
            )
            VALUES ($1, $2, $3, $4, $5, $6::JSONB, $7::JSONB, $8)
            "#,
        )
        .bind(event.tenant_id.as_uuid())
        .bind(event.subject)
        .bind(event.action.as_str())
        .bind(event.resource_type)
        .bind(event.resource_id)
        .bind(snapshot_text(event.before.as_ref()))
        .bind(snapshot_text(event.after.as_ref()))
        .bind(event.occurred_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append audit event: {error}")))?;

        Ok(())
    }
}
