use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgExecutor, PgPool, Postgres, QueryBuilder};

use sigma_application::{AccountQuery, AccountRepository, CodeGenerator, Page};
use sigma_core::{AppError, AppResult, TenantId};
use sigma_domain::{Account, AccountId};

mod query;

use query::{push_order_by, push_where};

const ACCOUNT_COLUMNS: &str = "id, name, legal_name, server_address, expiration, plan, detail, \
     phone, email, website, account_type, code, created_at, updated_at";

/// PostgreSQL-backed account repository.
#[derive(Clone)]
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: i64,
    name: String,
    legal_name: String,
    server_address: String,
    expiration: Option<NaiveDate>,
    plan: String,
    detail: String,
    phone: String,
    email: String,
    website: String,
    account_type: String,
    code: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AppError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let id = u64::try_from(row.id)
            .map_err(|error| AppError::Internal(format!("invalid stored account id: {error}")))
            .and_then(AccountId::new)?;

        Ok(Self {
            id: Some(id),
            name: row.name,
            legal_name: row.legal_name,
            server_address: row.server_address,
            expiration: row.expiration,
            plan: row.plan,
            detail: row.detail,
            phone: row.phone,
            email: row.email,
            website: row.website,
            account_type: row.account_type,
            code: row.code,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}

fn row_id(id: AccountId) -> AppResult<i64> {
    i64::try_from(id.as_u64())
        .map_err(|error| AppError::Validation(format!("account id '{id}' is out of range: {error}")))
}

async fn insert_row<'e, E>(
    executor: E,
    tenant_id: TenantId,
    account: &Account,
) -> Result<AccountRow, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, AccountRow>(&format!(
        r#"
        INSERT INTO accounts (
            tenant_id, name, legal_name, server_address, expiration, plan, detail,
            phone, email, website, account_type, code
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING {ACCOUNT_COLUMNS}
        "#
    ))
    .bind(tenant_id.as_uuid())
    .bind(account.name.as_str())
    .bind(account.legal_name.as_str())
    .bind(account.server_address.as_str())
    .bind(account.expiration)
    .bind(account.plan.as_str())
    .bind(account.detail.as_str())
    .bind(account.phone.as_str())
    .bind(account.email.as_str())
    .bind(account.website.as_str())
    .bind(account.account_type.as_str())
    .bind(account.code.as_str())
    .fetch_one(executor)
    .await
}

fn map_write_error(error: sqlx::Error, account: &Account, operation: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!(
            "account code '{}' is already in use",
            account.code
        ));
    }

    AppError::Internal(format!("failed to {operation} account: {error}"))
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn find_account(
        &self,
        tenant_id: TenantId,
        id: AccountId,
    ) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE tenant_id = $1 AND id = $2"
        ))
        .bind(tenant_id.as_uuid())
        .bind(row_id(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find account: {error}")))?;

        row.map(Account::try_from).transpose()
    }

    async fn list_accounts(
        &self,
        tenant_id: TenantId,
        query: &AccountQuery,
    ) -> AppResult<Page<Account>> {
        let mut count_builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM accounts");
        push_where(&mut count_builder, tenant_id, query)?;
        let total = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to count accounts: {error}")))?;
        let total = u64::try_from(total).unwrap_or_default();

        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {ACCOUNT_COLUMNS} FROM accounts"));
        push_where(&mut builder, tenant_id, query)?;
        push_order_by(&mut builder, query);

        if let Some(pagination) = query.pagination {
            let limit = i64::try_from(pagination.limit).map_err(|error| {
                AppError::Validation(format!("invalid account query limit: {error}"))
            })?;
            let offset = i64::try_from(pagination.offset).map_err(|error| {
                AppError::Validation(format!("invalid account query offset: {error}"))
            })?;
            builder.push(" LIMIT ");
            builder.push_bind(limit);
            builder.push(" OFFSET ");
            builder.push_bind(offset);
        }

        let items = builder
            .build_query_as::<AccountRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list accounts: {error}")))?
            .into_iter()
            .map(Account::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        let (offset, limit) = query
            .pagination
            .map_or((0, total), |pagination| (pagination.offset, pagination.limit));

        Ok(Page {
            items,
            total,
            offset,
            limit,
        })
    }

    async fn insert_account(&self, tenant_id: TenantId, account: Account) -> AppResult<Account> {
        let row = insert_row(&self.pool, tenant_id, &account)
            .await
            .map_err(|error| map_write_error(error, &account, "create"))?;

        Account::try_from(row)
    }

    async fn insert_account_with_generated_code(
        &self,
        tenant_id: TenantId,
        account: Account,
        generate_code: CodeGenerator,
    ) -> AppResult<Account> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to start account transaction: {error}"))
        })?;

        let inserted = insert_row(&mut *transaction, tenant_id, &account)
            .await
            .map_err(|error| map_write_error(error, &account, "create"))?;
        let mut coded = Account::try_from(inserted)?;
        let Some(id) = coded.id else {
            return Err(AppError::Internal(
                "inserted account has no identifier".to_owned(),
            ));
        };
        coded.code = generate_code(id);

        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "UPDATE accounts SET code = $3 WHERE tenant_id = $1 AND id = $2 \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(tenant_id.as_uuid())
        .bind(row_id(id)?)
        .bind(coded.code.as_str())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| map_write_error(error, &coded, "create"))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit account transaction: {error}"))
        })?;

        Account::try_from(row)
    }

    async fn update_account(
        &self,
        tenant_id: TenantId,
        account: Account,
    ) -> AppResult<Option<Account>> {
        let Some(id) = account.id else {
            return Err(AppError::Validation(
                "account id is required for updates".to_owned(),
            ));
        };

        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            UPDATE accounts
            SET name = $3,
                legal_name = $4,
                server_address = $5,
                expiration = $6,
                plan = $7,
                detail = $8,
                phone = $9,
                email = $10,
                website = $11,
                account_type = $12,
                code = $13,
                updated_at = now()
            WHERE tenant_id = $1 AND id = $2
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(tenant_id.as_uuid())
        .bind(row_id(id)?)
        .bind(account.name.as_str())
        .bind(account.legal_name.as_str())
        .bind(account.server_address.as_str())
        .bind(account.expiration)
        .bind(account.plan.as_str())
        .bind(account.detail.as_str())
        .bind(account.phone.as_str())
        .bind(account.email.as_str())
        .bind(account.website.as_str())
        .bind(account.account_type.as_str())
        .bind(account.code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_write_error(error, &account, "update"))?;

        row.map(Account::try_from).transpose()
    }

    async fn delete_account(
        &self,
        tenant_id: TenantId,
        id: AccountId,
    ) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "DELETE FROM accounts WHERE tenant_id = $1 AND id = $2 RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(tenant_id.as_uuid())
        .bind(row_id(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete account: {error}")))?;

        row.map(Account::try_from).transpose()
    }

    async fn code_in_use(
        &self,
        tenant_id: TenantId,
        code: &str,
        excluding: Option<AccountId>,
    ) -> AppResult<bool> {
        let excluding = excluding.map(row_id).transpose()?;

        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM accounts
                WHERE tenant_id = $1
                    AND code = $2
                    AND ($3::BIGINT IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(code)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to check account code: {error}")))
    }
}
