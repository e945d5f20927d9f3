//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_account_repository;
mod in_memory_audit_repository;
mod in_memory_authorization_repository;
mod postgres_account_repository;
mod postgres_audit_repository;
mod postgres_authorization_repository;
mod static_message_catalog;

pub use in_memory_account_repository::InMemoryAccountRepository;
pub use in_memory_audit_repository::InMemoryAuditRepository;
pub use in_memory_authorization_repository::InMemoryAuthorizationRepository;
pub use postgres_account_repository::PostgresAccountRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use static_message_catalog::StaticMessageCatalog;
