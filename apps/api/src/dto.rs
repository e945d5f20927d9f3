use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sigma_application::Page;
use sigma_domain::{Account, AccountId};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Incoming account payload for create and update.
#[derive(Debug, Default, Deserialize, TS)]
#[serde(default)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/account-request.ts"
)]
pub struct AccountRequest {
    pub id: Option<u64>,
    pub name: String,
    pub legal_name: String,
    pub server_address: String,
    #[ts(type = "string | null")]
    pub expiration: Option<NaiveDate>,
    pub plan: String,
    pub detail: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub code: String,
}

impl AccountRequest {
    /// Converts the payload, dropping any identifier it carried.
    pub fn into_account(self) -> Account {
        Account {
            id: None,
            name: self.name,
            legal_name: self.legal_name,
            server_address: self.server_address,
            expiration: self.expiration,
            plan: self.plan,
            detail: self.detail,
            phone: self.phone,
            email: self.email,
            website: self.website,
            account_type: self.account_type,
            code: self.code,
            created_at: None,
            updated_at: None,
        }
    }

    /// Converts the payload under the identifier taken from the path.
    pub fn into_account_with_id(self, id: AccountId) -> Account {
        Account {
            id: Some(id),
            ..self.into_account()
        }
    }
}

/// API representation of an account.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/account-response.ts"
)]
pub struct AccountResponse {
    pub id: Option<u64>,
    pub name: String,
    pub legal_name: String,
    pub server_address: String,
    #[ts(type = "string | null")]
    pub expiration: Option<NaiveDate>,
    pub plan: String,
    pub detail: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub code: String,
    #[ts(type = "string | null")]
    pub created_at: Option<DateTime<Utc>>,
    #[ts(type = "string | null")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.map(|id| id.as_u64()),
            name: account.name,
            legal_name: account.legal_name,
            server_address: account.server_address,
            expiration: account.expiration,
            plan: account.plan,
            detail: account.detail,
            phone: account.phone,
            email: account.email,
            website: account.website,
            account_type: account.account_type,
            code: account.code,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// One page of accounts.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/account-page-response.ts"
)]
pub struct AccountPageResponse {
    pub items: Vec<AccountResponse>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

impl From<Page<Account>> for AccountPageResponse {
    fn from(page: Page<Account>) -> Self {
        let page = page.map(AccountResponse::from);
        Self {
            items: page.items,
            total: page.total,
            offset: page.offset,
            limit: page.limit,
        }
    }
}
