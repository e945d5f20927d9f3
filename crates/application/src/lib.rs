//! Application services and ports.

#![forbid(unsafe_code)]

mod account_ports;
mod account_service;
mod audit;
mod authorization_service;
mod message_catalog;
mod query_resolver;

pub use account_ports::{
    AccountFilter, AccountQuery, AccountRepository, AccountSort, CodeGenerator, Page,
};
pub use account_service::{AUTO_CODE_OPTION, AccountService};
pub use audit::{AuditEvent, AuditRecord, AuditRecorder, AuditRepository};
pub use authorization_service::{AuthorizationRepository, AuthorizationService};
pub use message_catalog::MessageCatalog;
pub use query_resolver::{QueryDefaults, resolve_query};
