//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod account;
mod message;
mod query;
mod security;

pub use account::{Account, AccountField, AccountId, FieldKind, FieldValue};
pub use message::MessageKey;
pub use query::{
    FilterCondition, FilterOperator, Pagination, QueryDescriptor, SortDirection, SortField,
};
pub use security::{AuditAction, Permission};
