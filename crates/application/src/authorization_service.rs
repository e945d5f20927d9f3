use std::sync::Arc;

use async_trait::async_trait;
use sigma_core::{AppResult, TenantId, UserIdentity};
use sigma_domain::Permission;
use tracing::{debug, warn};

/// Repository port for permission lookups.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Lists effective permissions for a subject in a tenant.
    ///
    /// Stored capability values that no longer map to a [`Permission`] must be
    /// dropped by the adapter, never widened.
    async fn list_permissions_for_subject(
        &self,
        tenant_id: TenantId,
        subject: &str,
    ) -> AppResult<Vec<Permission>>;
}

/// Access gate answering whether a caller holds a capability.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn AuthorizationRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AuthorizationRepository>) -> Self {
        Self { repository }
    }

    /// Returns whether the caller currently holds the permission.
    ///
    /// Lookup failures deny access.
    pub async fn is_allowed(&self, actor: &UserIdentity, permission: Permission) -> bool {
        let permissions = match self
            .repository
            .list_permissions_for_subject(actor.tenant_id(), actor.subject())
            .await
        {
            Ok(permissions) => permissions,
            Err(error) => {
                warn!(
                    subject = actor.subject(),
                    tenant_id = %actor.tenant_id(),
                    permission = permission.as_str(),
                    %error,
                    "permission lookup failed, denying access"
                );
                return false;
            }
        };

        let allowed = permissions.contains(&permission);
        if !allowed {
            debug!(
                subject = actor.subject(),
                permission = permission.as_str(),
                "access denied"
            );
        }

        allowed
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use sigma_core::{AppError, AppResult, TenantId, UserIdentity};
    use sigma_domain::Permission;

    use super::{AuthorizationRepository, AuthorizationService};

    struct FakeAuthorizationRepository {
        map: HashMap<(TenantId, String), Vec<Permission>>,
    }

    #[async_trait]
    impl AuthorizationRepository for FakeAuthorizationRepository {
        async fn list_permissions_for_subject(
            &self,
            tenant_id: TenantId,
            subject: &str,
        ) -> AppResult<Vec<Permission>> {
            Ok(self
                .map
                .get(&(tenant_id, subject.to_owned()))
                .cloned()
                .unwrap_or_default())
        }
    }

    struct FailingAuthorizationRepository;

    #[async_trait]
    impl AuthorizationRepository for FailingAuthorizationRepository {
        async fn list_permissions_for_subject(
            &self,
            _tenant_id: TenantId,
            _subject: &str,
        ) -> AppResult<Vec<Permission>> {
            Err(AppError::Internal("grant store offline".to_owned()))
        }
    }

    #[tokio::test]
    async fn allows_granted_subject() {
        let tenant_id = TenantId::new();
        let actor = UserIdentity::new("alice", "Alice", tenant_id);
        let service = AuthorizationService::new(Arc::new(FakeAuthorizationRepository {
            map: HashMap::from([(
                (tenant_id, "alice".to_owned()),
                vec![Permission::AccountRead],
            )]),
        }));

        assert!(service.is_allowed(&actor, Permission::AccountRead).await);
        assert!(!service.is_allowed(&actor, Permission::AccountWrite).await);
    }

    #[tokio::test]
    async fn grants_do_not_leak_across_tenants() {
        let tenant_id = TenantId::new();
        let service = AuthorizationService::new(Arc::new(FakeAuthorizationRepository {
            map: HashMap::from([(
                (tenant_id, "alice".to_owned()),
                vec![Permission::AccountWrite],
            )]),
        }));

        let foreign_actor = UserIdentity::new("alice", "Alice", TenantId::new());
        assert!(
            !service
                .is_allowed(&foreign_actor, Permission::AccountWrite)
                .await
        );
    }

    #[tokio::test]
    async fn lookup_failure_denies() {
        let actor = UserIdentity::new("alice", "Alice", TenantId::new());
        let service = AuthorizationService::new(Arc::new(FailingAuthorizationRepository));

        assert!(!service.is_allowed(&actor, Permission::AccountRead).await);
    }
}
