use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use sigma_application::{AccountFilter, AccountQuery, AccountRepository, CodeGenerator, Page};
use sigma_core::{AppError, AppResult, TenantId};
use sigma_domain::{Account, AccountField, AccountId, FieldValue, FilterOperator, SortDirection};
use tokio::sync::RwLock;

/// In-memory account repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<TenantId, BTreeMap<u64, Account>>>,
    next_id: RwLock<u64>,
}

impl InMemoryAccountRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn insert_with(
        &self,
        tenant_id: TenantId,
        mut account: Account,
        generate_code: Option<CodeGenerator>,
    ) -> AppResult<Account> {
        let mut accounts = self.accounts.write().await;
        let rows = accounts.entry(tenant_id).or_default();
        let mut next_id = self.next_id.write().await;
        let id = AccountId::new(*next_id + 1)?;

        if let Some(generate_code) = generate_code {
            account.code = generate_code(id);
        }
        ensure_code_available(rows, &account, None)?;

        // Only consume the identifier once the row is accepted.
        *next_id = id.as_u64();
        let now = Utc::now();
        account.id = Some(id);
        account.created_at = Some(now);
        account.updated_at = Some(now);
        rows.insert(id.as_u64(), account.clone());

        Ok(account)
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_account(
        &self,
        tenant_id: TenantId,
        id: AccountId,
    ) -> AppResult<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .await
            .get(&tenant_id)
            .and_then(|rows| rows.get(&id.as_u64()))
            .cloned())
    }

    async fn list_accounts(
        &self,
        tenant_id: TenantId,
        query: &AccountQuery,
    ) -> AppResult<Page<Account>> {
        let accounts = self.accounts.read().await;
        let search = query.search.as_deref().map(str::to_lowercase);

        let mut matching: Vec<Account> = accounts
            .get(&tenant_id)
            .map(|rows| {
                rows.values()
                    .filter(|account| {
                        query
                            .filters
                            .iter()
                            .all(|filter| filter_matches(filter, account))
                    })
                    .filter(|account| {
                        search
                            .as_deref()
                            .is_none_or(|term| search_matches(term, account))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        matching.sort_by(|left, right| {
            query
                .sort
                .iter()
                .map(|sort| {
                    let ordering = left
                        .value_of(sort.field)
                        .partial_cmp(&right.value_of(sort.field))
                        .unwrap_or(Ordering::Equal);
                    match sort.direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| left.id.cmp(&right.id))
        });

        let total = matching.len() as u64;
        let Some(pagination) = query.pagination else {
            return Ok(Page {
                items: matching,
                total,
                offset: 0,
                limit: total,
            });
        };

        let skip = usize::try_from(pagination.offset).unwrap_or(usize::MAX);
        let take = usize::try_from(pagination.limit).unwrap_or(usize::MAX);
        let items = matching.into_iter().skip(skip).take(take).collect();

        Ok(Page {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn insert_account(&self, tenant_id: TenantId, account: Account) -> AppResult<Account> {
        self.insert_with(tenant_id, account, None).await
    }

    async fn insert_account_with_generated_code(
        &self,
        tenant_id: TenantId,
        account: Account,
        generate_code: CodeGenerator,
    ) -> AppResult<Account> {
        self.insert_with(tenant_id, account, Some(generate_code))
            .await
    }

    async fn update_account(
        &self,
        tenant_id: TenantId,
        mut account: Account,
    ) -> AppResult<Option<Account>> {
        let Some(id) = account.id else {
            return Err(AppError::Validation(
                "account id is required for updates".to_owned(),
            ));
        };

        let mut accounts = self.accounts.write().await;
        let Some(rows) = accounts.get_mut(&tenant_id) else {
            return Ok(None);
        };
        let Some(created_at) = rows.get(&id.as_u64()).map(|existing| existing.created_at) else {
            return Ok(None);
        };
        ensure_code_available(rows, &account, Some(id))?;

        account.created_at = created_at;
        account.updated_at = Some(Utc::now());
        rows.insert(id.as_u64(), account.clone());

        Ok(Some(account))
    }

    async fn delete_account(
        &self,
        tenant_id: TenantId,
        id: AccountId,
    ) -> AppResult<Option<Account>> {
        Ok(self
            .accounts
            .write()
            .await
            .get_mut(&tenant_id)
            .and_then(|rows| rows.remove(&id.as_u64())))
    }

    async fn code_in_use(
        &self,
        tenant_id: TenantId,
        code: &str,
        excluding: Option<AccountId>,
    ) -> AppResult<bool> {
        Ok(self
            .accounts
            .read()
            .await
            .get(&tenant_id)
            .is_some_and(|rows| code_taken(rows, code, excluding)))
    }
}

fn code_taken(rows: &BTreeMap<u64, Account>, code: &str, excluding: Option<AccountId>) -> bool {
    rows.values()
        .any(|account| account.code == code && account.id != excluding)
}

fn ensure_code_available(
    rows: &BTreeMap<u64, Account>,
    account: &Account,
    excluding: Option<AccountId>,
) -> AppResult<()> {
    if !account.code.is_empty() && code_taken(rows, account.code.as_str(), excluding) {
        return Err(AppError::Conflict(format!(
            "account code '{}' is already in use",
            account.code
        )));
    }

    Ok(())
}

fn filter_matches(filter: &AccountFilter, account: &Account) -> bool {
    let value = account.value_of(filter.field);
    if filter.operator == FilterOperator::Like {
        return value
            .to_search_text()
            .contains(filter.value.to_search_text().as_str());
    }

    // Missing values never satisfy a comparison.
    if value == FieldValue::Null {
        return false;
    }

    let Some(ordering) = value.partial_cmp(&filter.value) else {
        return false;
    };

    match filter.operator {
        FilterOperator::Eq => ordering.is_eq(),
        FilterOperator::Ne => ordering.is_ne(),
        FilterOperator::Gt => ordering.is_gt(),
        FilterOperator::Gte => ordering.is_ge(),
        FilterOperator::Lt => ordering.is_lt(),
        FilterOperator::Lte => ordering.is_le(),
        FilterOperator::Like => false,
    }
}

fn search_matches(term: &str, account: &Account) -> bool {
    AccountField::all()
        .iter()
        .filter(|field| field.is_searchable())
        .any(|field| account.value_of(*field).to_search_text().contains(term))
}

#[cfg(test)]
mod tests;
