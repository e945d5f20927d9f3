use std::sync::Arc;

use sigma_core::{AppError, AppResult, NonEmptyString, UserIdentity};
use sigma_domain::{Account, AccountId, QueryDescriptor};

use crate::{AccountQuery, AccountRepository, Page};

/// Creation option generating a code for accounts submitted without one.
pub const AUTO_CODE_OPTION: &str = "auto_code";

/// Application service for tenant-scoped account use-cases.
#[derive(Clone)]
pub struct AccountService {
    repository: Arc<dyn AccountRepository>,
}

impl AccountService {
    /// Creates a new service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AccountRepository>) -> Self {
        Self { repository }
    }

    /// Returns one account or [`AppError::NotFound`].
    pub async fn find_by_id(&self, actor: &UserIdentity, id: AccountId) -> AppResult<Account> {
        self.repository
            .find_account(actor.tenant_id(), id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("account '{id}' does not exist")))
    }

    /// Lists one page of accounts.
    pub async fn list(
        &self,
        actor: &UserIdentity,
        query: &QueryDescriptor,
    ) -> AppResult<Page<Account>> {
        let query = AccountQuery::from_descriptor(query)?;
        self.repository
            .list_accounts(actor.tenant_id(), &query)
            .await
    }

    /// Returns every account matching the filters, ignoring pagination.
    pub async fn excel(
        &self,
        actor: &UserIdentity,
        query: &QueryDescriptor,
    ) -> AppResult<Vec<Account>> {
        let query = AccountQuery::from_descriptor(query)?.unpaged();
        Ok(self
            .repository
            .list_accounts(actor.tenant_id(), &query)
            .await?
            .items)
    }

    /// Creates an account. Any submitted identifier is discarded.
    pub async fn create(
        &self,
        actor: &UserIdentity,
        account: Account,
        query: &QueryDescriptor,
    ) -> AppResult<Account> {
        let mut account = normalize(account)?;
        account.id = None;
        account.created_at = None;
        account.updated_at = None;

        if !account.code.is_empty()
            && self
                .repository
                .code_in_use(actor.tenant_id(), account.code.as_str(), None)
                .await?
        {
            return Err(duplicate_code(account.code.as_str()));
        }

        let tenant_id = actor.tenant_id();
        if account.code.is_empty() && query.flag(AUTO_CODE_OPTION) {
            return self
                .repository
                .insert_account_with_generated_code(tenant_id, account, generated_code)
                .await;
        }

        self.repository.insert_account(tenant_id, account).await
    }

    /// Replaces an existing account keyed by its identifier.
    pub async fn save(&self, actor: &UserIdentity, account: Account) -> AppResult<Account> {
        let Some(id) = account.id else {
            return Err(AppError::Validation(
                "account id is required when saving".to_owned(),
            ));
        };

        let account = normalize(account)?;

        if !account.code.is_empty()
            && self
                .repository
                .code_in_use(actor.tenant_id(), account.code.as_str(), Some(id))
                .await?
        {
            return Err(duplicate_code(account.code.as_str()));
        }

        self.repository
            .update_account(actor.tenant_id(), account)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("account '{id}' does not exist")))
    }

    /// Deletes an account and returns the removed row.
    pub async fn delete(&self, actor: &UserIdentity, id: AccountId) -> AppResult<Account> {
        self.repository
            .delete_account(actor.tenant_id(), id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("account '{id}' does not exist")))
    }
}

fn normalize(mut account: Account) -> AppResult<Account> {
    account.name = NonEmptyString::new(account.name.trim())
        .map_err(|_| AppError::Validation("account name is required".to_owned()))?
        .into();
    account.code = account.code.trim().to_owned();
    account.email = account.email.trim().to_lowercase();

    if !account.email.is_empty() && !looks_like_email(account.email.as_str()) {
        return Err(AppError::Validation(format!(
            "'{}' is not a valid email address",
            account.email
        )));
    }

    Ok(account)
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.contains('@')
        }
        None => false,
    }
}

fn duplicate_code(code: &str) -> AppError {
    AppError::Conflict(format!("account code '{code}' is already in use"))
}

fn generated_code(id: AccountId) -> String {
    format!("ACC-{:06}", id.as_u64())
}
