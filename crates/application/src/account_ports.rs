use std::str::FromStr;

use async_trait::async_trait;
use serde::Serialize;
use sigma_core::{AppResult, TenantId};
use sigma_domain::{
    Account, AccountField, AccountId, FieldValue, FilterOperator, Pagination, QueryDescriptor,
    SortDirection,
};

/// One page of a listing together with the unpaged total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Rows in the requested window.
    pub items: Vec<T>,
    /// Number of rows matching the filters.
    pub total: u64,
    /// Rows skipped.
    pub offset: u64,
    /// Requested window size.
    pub limit: u64,
}

impl<T> Page<T> {
    /// Maps the rows while keeping the window metadata.
    pub fn map<U>(self, mapper: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(mapper).collect(),
            total: self.total,
            offset: self.offset,
            limit: self.limit,
        }
    }
}

/// Typed account filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountFilter {
    /// Filtered field.
    pub field: AccountField,
    /// Comparison operator.
    pub operator: FilterOperator,
    /// Comparison value, always text for `like`.
    pub value: FieldValue,
}

/// Typed account sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountSort {
    /// Sorted field.
    pub field: AccountField,
    /// Direction.
    pub direction: SortDirection,
}

/// Account query handed to repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountQuery {
    /// Conjunctive filters.
    pub filters: Vec<AccountFilter>,
    /// Sort keys; repositories append `id` as the final tiebreaker.
    pub sort: Vec<AccountSort>,
    /// Case-insensitive search over searchable fields.
    pub search: Option<String>,
    /// Window, `None` for unpaged exports.
    pub pagination: Option<Pagination>,
}

impl AccountQuery {
    /// Builds a typed query from a resolved descriptor.
    pub fn from_descriptor(descriptor: &QueryDescriptor) -> AppResult<Self> {
        let filters = descriptor
            .filters
            .iter()
            .map(|condition| {
                let field = AccountField::from_str(condition.field.as_str())?;
                let value = match condition.operator {
                    FilterOperator::Like => FieldValue::Text(condition.value.trim().to_owned()),
                    _ => FieldValue::parse(field.kind(), condition.value.as_str())?,
                };

                Ok(AccountFilter {
                    field,
                    operator: condition.operator,
                    value,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let sort = descriptor
            .sort
            .iter()
            .map(|entry| {
                Ok(AccountSort {
                    field: AccountField::from_str(entry.field.as_str())?,
                    direction: entry.direction,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            filters,
            sort,
            search: descriptor.search.clone(),
            pagination: Some(descriptor.pagination),
        })
    }

    /// Drops pagination so every matching row is returned.
    #[must_use]
    pub fn unpaged(mut self) -> Self {
        self.pagination = None;
        self
    }
}

/// Derives an account code from a freshly assigned identifier.
pub type CodeGenerator = fn(AccountId) -> String;

/// Repository port for tenant-scoped account storage.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Finds one account.
    async fn find_account(&self, tenant_id: TenantId, id: AccountId)
    -> AppResult<Option<Account>>;

    /// Lists accounts matching the query; an unpaged query returns every row.
    async fn list_accounts(&self, tenant_id: TenantId, query: &AccountQuery)
    -> AppResult<Page<Account>>;

    /// Inserts a new account and returns it with identifier and timestamps set.
    async fn insert_account(&self, tenant_id: TenantId, account: Account) -> AppResult<Account>;

    /// Inserts a new account whose code is derived from the identifier it
    /// receives. The row and its code are written together or not at all.
    async fn insert_account_with_generated_code(
        &self,
        tenant_id: TenantId,
        account: Account,
        generate_code: CodeGenerator,
    ) -> AppResult<Account>;

    /// Replaces an existing account, returning `None` when it does not exist.
    async fn update_account(
        &self,
        tenant_id: TenantId,
        account: Account,
    ) -> AppResult<Option<Account>>;

    /// Removes an account, returning the removed row when it existed.
    async fn delete_account(&self, tenant_id: TenantId, id: AccountId)
    -> AppResult<Option<Account>>;

    /// Returns whether another account in the tenant already uses the code.
    async fn code_in_use(
        &self,
        tenant_id: TenantId,
        code: &str,
        excluding: Option<AccountId>,
    ) -> AppResult<bool>;
}
