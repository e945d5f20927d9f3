use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sigma_core::{AppResult, TenantId, UserIdentity};
use sigma_domain::AuditAction;
use tracing::{debug, info, warn};

/// Immutable audit event payload appended after a completed action.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    /// Tenant scope for the event.
    pub tenant_id: TenantId,
    /// Subject that performed the action.
    pub subject: String,
    /// Stable audit action identifier.
    pub action: AuditAction,
    /// Resource type label.
    pub resource_type: String,
    /// Resource identifier, absent for collection-level actions.
    pub resource_id: Option<String>,
    /// Entity state before the action.
    pub before: Option<Value>,
    /// Entity state after the action.
    pub after: Option<Value>,
    /// Emission timestamp.
    pub occurred_at: DateTime<Utc>,
}

/// Port for persisting append-only audit events.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Persists one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}

/// Description of one audited action, built by the caller before recording.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    action: AuditAction,
    resource_type: &'static str,
    resource_id: Option<String>,
    before: Option<Value>,
    after: Option<Value>,
}

impl AuditRecord {
    /// Starts a record for an action on a resource type.
    #[must_use]
    pub fn new(action: AuditAction, resource_type: &'static str) -> Self {
        Self {
            action,
            resource_type,
            resource_id: None,
            before: None,
            after: None,
        }
    }

    /// Sets the identifier of the affected resource.
    #[must_use]
    pub fn resource_id(mut self, resource_id: impl ToString) -> Self {
        self.resource_id = Some(resource_id.to_string());
        self
    }

    /// Attaches the state prior to the action.
    #[must_use]
    pub fn before<T: Serialize>(mut self, snapshot: &T) -> Self {
        self.before = snapshot_value(self.action, snapshot);
        self
    }

    /// Attaches the state produced by the action.
    #[must_use]
    pub fn after<T: Serialize>(mut self, snapshot: &T) -> Self {
        self.after = snapshot_value(self.action, snapshot);
        self
    }
}

fn snapshot_value<T: Serialize>(action: AuditAction, snapshot: &T) -> Option<Value> {
    match serde_json::to_value(snapshot) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(action = action.as_str(), %error, "failed to serialize audit snapshot");
            None
        }
    }
}

/// Fire-and-log recorder in front of an [`AuditRepository`].
///
/// The append runs on its own task so a dropped request cannot abort it; the
/// caller still awaits completion so the event lands before the response.
#[derive(Clone)]
pub struct AuditRecorder {
    repository: Arc<dyn AuditRepository>,
}

impl AuditRecorder {
    /// Creates a recorder writing into the given repository.
    #[must_use]
    pub fn new(repository: Arc<dyn AuditRepository>) -> Self {
        Self { repository }
    }

    /// Records one event for the actor. Failures are logged, never returned.
    pub async fn record(&self, actor: &UserIdentity, record: AuditRecord) {
        let event = AuditEvent {
            tenant_id: actor.tenant_id(),
            subject: actor.subject().to_owned(),
            action: record.action,
            resource_type: record.resource_type.to_owned(),
            resource_id: record.resource_id,
            before: record.before,
            after: record.after,
            occurred_at: Utc::now(),
        };

        let action = event.action;
        let repository = self.repository.clone();
        let write = tokio::spawn(async move { repository.append_event(event).await });

        match write.await {
            Ok(Ok(())) if action.is_mutation() => {
                info!(action = action.as_str(), "audit event recorded");
            }
            Ok(Ok(())) => debug!(action = action.as_str(), "audit event recorded"),
            Ok(Err(error)) => {
                warn!(action = action.as_str(), %error, "failed to record audit event");
            }
            Err(error) => {
                warn!(action = action.as_str(), %error, "audit write task did not complete");
            }
        }
    }
}
