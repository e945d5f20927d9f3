use std::sync::Arc;

use sigma_application::{AccountService, AuditRecorder, AuthorizationService, MessageCatalog};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub account_service: AccountService,
    pub authorization_service: AuthorizationService,
    pub audit_recorder: AuditRecorder,
    pub messages: Arc<dyn MessageCatalog>,
    pub default_language: String,
}
