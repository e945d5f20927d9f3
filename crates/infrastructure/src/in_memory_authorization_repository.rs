use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use sigma_application::AuthorizationRepository;
use sigma_core::{AppError, AppResult, TenantId};
use sigma_domain::Permission;
use tracing::warn;

/// Static grant table loaded once at startup.
///
/// Grants are written as `tenant/subject=perm,perm;tenant/subject=perm`.
/// Unknown capability names are dropped.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAuthorizationRepository {
    grants: HashMap<(TenantId, String), Vec<Permission>>,
}

impl InMemoryAuthorizationRepository {
    /// Creates a repository without any grants.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds permissions for one subject.
    #[must_use]
    pub fn with_grant(
        mut self,
        tenant_id: TenantId,
        subject: impl Into<String>,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        let entry = self.grants.entry((tenant_id, subject.into())).or_default();
        for permission in permissions {
            if !entry.contains(&permission) {
                entry.push(permission);
            }
        }
        self
    }

    /// Parses a grant table from its configuration form.
    pub fn parse(value: &str) -> AppResult<Self> {
        let mut repository = Self::new();

        for entry in value.split(';').map(str::trim).filter(|entry| !entry.is_empty()) {
            let Some((principal, permissions)) = entry.split_once('=') else {
                return Err(AppError::Validation(format!(
                    "grant '{entry}' must look like tenant/subject=perm,perm"
                )));
            };
            let Some((tenant, subject)) = principal.trim().split_once('/') else {
                return Err(AppError::Validation(format!(
                    "grant principal '{principal}' must look like tenant/subject"
                )));
            };
            let subject = subject.trim();
            if subject.is_empty() {
                return Err(AppError::Validation(format!(
                    "grant '{entry}' has an empty subject"
                )));
            }

            let tenant_id = TenantId::from_str(tenant)?;
            let permissions = permissions
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .filter_map(|name| match Permission::from_str(name) {
                    Ok(permission) => Some(permission),
                    Err(_) => {
                        warn!(subject, permission = name, "ignoring unknown granted permission");
                        None
                    }
                })
                .collect::<Vec<_>>();

            repository = repository.with_grant(tenant_id, subject, permissions);
        }

        Ok(repository)
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryAuthorizationRepository {
    async fn list_permissions_for_subject(
        &self,
        tenant_id: TenantId,
        subject: &str,
    ) -> AppResult<Vec<Permission>> {
        Ok(self
            .grants
            .get(&(tenant_id, subject.to_owned()))
            .cloned()
            .unwrap_or_default())
    }
}
