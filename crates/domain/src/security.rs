use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sigma_core::AppError;

/// Capabilities enforced by the access gate before any account action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Allows reading a single account.
    AccountRead,
    /// Allows listing and mutating accounts.
    AccountWrite,
    /// Allows exporting accounts to a spreadsheet.
    AccountExcel,
}

impl Permission {
    /// Returns a stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountRead => "account.read",
            Self::AccountWrite => "account.write",
            Self::AccountExcel => "account.excel",
        }
    }

    /// Returns all known permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Permission] = &[
            Permission::AccountRead,
            Permission::AccountWrite,
            Permission::AccountExcel,
        ];

        ALL
    }

    /// Parses a transport value into a permission.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "account.read" => Ok(Self::AccountRead),
            "account.write" => Ok(Self::AccountWrite),
            "account.excel" => Ok(Self::AccountExcel),
            _ => Err(AppError::Validation(format!(
                "unknown permission value '{value}'"
            ))),
        }
    }
}

/// Stable audit actions emitted by the account pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a single account was read.
    AccountView,
    /// Emitted when a page of accounts was listed.
    AccountList,
    /// Emitted when an account was created.
    AccountCreate,
    /// Emitted when an account was updated.
    AccountUpdate,
    /// Emitted when an account was deleted.
    AccountDelete,
    /// Emitted when accounts were exported to a spreadsheet.
    AccountExcel,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountView => "account.view",
            Self::AccountList => "account.list",
            Self::AccountCreate => "account.create",
            Self::AccountUpdate => "account.update",
            Self::AccountDelete => "account.delete",
            Self::AccountExcel => "account.excel",
        }
    }

    /// Returns whether the action describes a state change.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::AccountCreate | Self::AccountUpdate | Self::AccountDelete
        )
    }
}
