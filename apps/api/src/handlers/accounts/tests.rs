use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Json;
use axum::body::{Body, to_bytes};
use axum::extract::{Extension, FromRequest, Path, Query, State};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use serde_json::{Value, json};

use sigma_application::{
    AccountQuery, AccountRepository, AccountService, AuditEvent, AuditRecorder, AuditRepository,
    AuthorizationService, CodeGenerator, Page,
};
use sigma_core::{AppError, AppResult, TenantId, UserIdentity};
use sigma_domain::{Account, AccountId, AuditAction, Permission};
use sigma_infrastructure::{
    InMemoryAccountRepository, InMemoryAuditRepository, InMemoryAuthorizationRepository,
    StaticMessageCatalog,
};

use crate::dto::AccountRequest;
use crate::middleware::RequestContext;
use crate::state::AppState;

use super::{
    PipelineResult, create_account_handler, delete_account_handler, export_accounts_handler,
    find_account_handler, list_accounts_handler, update_account_handler,
};

/// Counts every repository call before delegating to the in-memory store.
#[derive(Default)]
struct CountingAccountRepository {
    inner: InMemoryAccountRepository,
    calls: AtomicUsize,
}

impl CountingAccountRepository {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AccountRepository for CountingAccountRepository {
    async fn find_account(
        &self,
        tenant_id: TenantId,
        id: AccountId,
    ) -> AppResult<Option<Account>> {
        self.touch();
        self.inner.find_account(tenant_id, id).await
    }

    async fn list_accounts(
        &self,
        tenant_id: TenantId,
        query: &AccountQuery,
    ) -> AppResult<Page<Account>> {
        self.touch();
        self.inner.list_accounts(tenant_id, query).await
    }

    async fn insert_account(&self, tenant_id: TenantId, account: Account) -> AppResult<Account> {
        self.touch();
        self.inner.insert_account(tenant_id, account).await
    }

    async fn insert_account_with_generated_code(
        &self,
        tenant_id: TenantId,
        account: Account,
        generate_code: CodeGenerator,
    ) -> AppResult<Account> {
        self.touch();
        self.inner
            .insert_account_with_generated_code(tenant_id, account, generate_code)
            .await
    }

    async fn update_account(
        &self,
        tenant_id: TenantId,
        account: Account,
    ) -> AppResult<Option<Account>> {
        self.touch();
        self.inner.update_account(tenant_id, account).await
    }

    async fn delete_account(
        &self,
        tenant_id: TenantId,
        id: AccountId,
    ) -> AppResult<Option<Account>> {
        self.touch();
        self.inner.delete_account(tenant_id, id).await
    }

    async fn code_in_use(
        &self,
        tenant_id: TenantId,
        code: &str,
        excluding: Option<AccountId>,
    ) -> AppResult<bool> {
        self.touch();
        self.inner.code_in_use(tenant_id, code, excluding).await
    }
}

struct UnavailableAuditRepository;

#[async_trait]
impl AuditRepository for UnavailableAuditRepository {
    async fn append_event(&self, _event: AuditEvent) -> AppResult<()> {
        Err(AppError::Internal("audit store unavailable".to_owned()))
    }
}

struct Harness {
    state: AppState,
    accounts: Arc<CountingAccountRepository>,
    audit: Arc<InMemoryAuditRepository>,
    context: RequestContext,
}

impl Harness {
    fn new(permissions: &[Permission]) -> Self {
        let tenant_id = TenantId::new();
        let accounts = Arc::new(CountingAccountRepository::default());
        let audit = Arc::new(InMemoryAuditRepository::new());
        let grants = InMemoryAuthorizationRepository::new().with_grant(
            tenant_id,
            "alice",
            permissions.iter().copied(),
        );

        let state = AppState {
            account_service: AccountService::new(accounts.clone()),
            authorization_service: AuthorizationService::new(Arc::new(grants)),
            audit_recorder: AuditRecorder::new(audit.clone()),
            messages: Arc::new(StaticMessageCatalog::new()),
            default_language: "en".to_owned(),
        };

        Self {
            state,
            accounts,
            audit,
            context: RequestContext {
                actor: UserIdentity::new("alice", "Alice", tenant_id),
                language: "en".to_owned(),
            },
        }
    }

    fn everything() -> Self {
        Self::new(Permission::all())
    }

    fn with_unavailable_audit() -> Self {
        let mut harness = Self::everything();
        harness.state.audit_recorder = AuditRecorder::new(Arc::new(UnavailableAuditRepository));
        harness
    }

    fn tenant_id(&self) -> TenantId {
        self.context.actor.tenant_id()
    }

    async fn seed(&self, name: &str) -> Account {
        let Ok(account) = self
            .accounts
            .inner
            .insert_account(self.tenant_id(), Account::new(name))
            .await
        else {
            panic!("seeding should succeed");
        };
        account
    }

    async fn actions(&self) -> Vec<AuditAction> {
        self.audit
            .events()
            .await
            .into_iter()
            .map(|event| event.action)
            .collect()
    }
}

fn merge(result: PipelineResult) -> Response {
    result.unwrap_or_else(|response| response)
}

async fn body_json(response: Response) -> Value {
    let Ok(bytes) = to_bytes(response.into_body(), usize::MAX).await else {
        panic!("body should be readable");
    };
    let Ok(value) = serde_json::from_slice(&bytes) else {
        panic!("body should be JSON");
    };
    value
}

fn request_body(name: &str, id: Option<u64>) -> Json<AccountRequest> {
    Json(AccountRequest {
        id,
        name: name.to_owned(),
        ..AccountRequest::default()
    })
}

fn no_params() -> Query<Vec<(String, String)>> {
    Query(Vec::new())
}

#[tokio::test]
async fn missing_capability_is_forbidden_without_side_effects() {
    let harness = Harness::new(&[Permission::AccountRead]);

    let response = merge(
        create_account_handler(
            State(harness.state.clone()),
            Extension(harness.context.clone()),
            no_params(),
            Ok(request_body("Acme", None)),
        )
        .await,
    );

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await,
        json!({"status": 403, "message": "You don't have permission for this action"})
    );
    assert_eq!(harness.accounts.calls(), 0);
    assert!(harness.actions().await.is_empty());
}

#[tokio::test]
async fn list_requires_write_capability() {
    let harness = Harness::new(&[Permission::AccountRead]);

    let response = merge(
        list_accounts_handler(
            State(harness.state.clone()),
            Extension(harness.context.clone()),
            no_params(),
        )
        .await,
    );

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(harness.accounts.calls(), 0);
}

#[tokio::test]
async fn find_returns_localized_envelope_and_records_view() {
    let harness = Harness::everything();
    harness.seed("Acme").await;

    let response = merge(
        find_account_handler(
            State(harness.state.clone()),
            Extension(harness.context.clone()),
            Path("1".to_owned()),
        )
        .await,
    );

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Account info");
    assert_eq!(body["data"]["name"], "Acme");
    assert_eq!(harness.actions().await, vec![AuditAction::AccountView]);
}

#[tokio::test]
async fn find_missing_is_localized_not_found() {
    let mut harness = Harness::everything();
    harness.context.language = "de".to_owned();

    let response = merge(
        find_account_handler(
            State(harness.state.clone()),
            Extension(harness.context.clone()),
            Path("9".to_owned()),
        )
        .await,
    );

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Datensatz nicht gefunden");
    assert_eq!(body["error"]["kind"], "not_found");
    assert!(harness.actions().await.is_empty());
}

#[tokio::test]
async fn malformed_identifier_is_bad_request() {
    let harness = Harness::everything();

    let response = merge(
        delete_account_handler(
            State(harness.state.clone()),
            Extension(harness.context.clone()),
            Path("abc".to_owned()),
        )
        .await,
    );

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid id");
    assert_eq!(harness.accounts.calls(), 0);
}

#[tokio::test]
async fn create_assigns_server_identifier() {
    let harness = Harness::everything();

    let response = merge(
        create_account_handler(
            State(harness.state.clone()),
            Extension(harness.context.clone()),
            no_params(),
            Ok(request_body("Acme", Some(77))),
        )
        .await,
    );

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Account created successfully");
    assert_eq!(body["data"]["id"], 1);

    let events = harness.audit.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::AccountCreate);
    assert!(events[0].before.is_none());
    assert_eq!(
        events[0].after.as_ref().map(|after| after["name"].clone()),
        Some(json!("Acme"))
    );
}

#[tokio::test]
async fn create_honors_auto_code_option() {
    let harness = Harness::everything();

    let response = merge(
        create_account_handler(
            State(harness.state.clone()),
            Extension(harness.context.clone()),
            Query(vec![("accounts.auto_code".to_owned(), "true".to_owned())]),
            Ok(request_body("Acme", None)),
        )
        .await,
    );

    assert_eq!(body_json(response).await["data"]["code"], "ACC-000001");
}

#[tokio::test]
async fn malformed_body_is_not_acceptable_with_raw_message() {
    let harness = Harness::everything();
    let Ok(request) = Request::builder()
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": 5"))
    else {
        panic!("request should build");
    };
    let rejection = match Json::<AccountRequest>::from_request(request, &()).await {
        Ok(_) => panic!("body should be rejected"),
        Err(rejection) => rejection,
    };

    let response = merge(
        create_account_handler(
            State(harness.state.clone()),
            Extension(harness.context.clone()),
            no_params(),
            Err(rejection),
        )
        .await,
    );

    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    let body = body_json(response).await;
    assert!(body["message"].is_string());
    assert!(body.get("status").is_none());
    assert_eq!(harness.accounts.calls(), 0);
}

#[tokio::test]
async fn update_records_pre_save_snapshot() {
    let harness = Harness::everything();
    harness.seed("Acme").await;

    let response = merge(
        update_account_handler(
            State(harness.state.clone()),
            Extension(harness.context.clone()),
            Path("1".to_owned()),
            Ok(request_body("Acme Corp", None)),
        )
        .await,
    );

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["name"], "Acme Corp");

    let events = harness.audit.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::AccountUpdate);
    assert_eq!(
        events[0].before.as_ref().map(|before| before["name"].clone()),
        Some(json!("Acme"))
    );
    assert_eq!(
        events[0].after.as_ref().map(|after| after["name"].clone()),
        Some(json!("Acme Corp"))
    );
}

#[tokio::test]
async fn update_path_identifier_wins_over_body() {
    let harness = Harness::everything();
    for index in 0..42 {
        harness.seed(format!("Account {index}").as_str()).await;
    }

    let response = merge(
        update_account_handler(
            State(harness.state.clone()),
            Extension(harness.context.clone()),
            Path("42".to_owned()),
            Ok(request_body("Renamed", Some(7))),
        )
        .await,
    );

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["id"], 42);

    let tenant_id = harness.tenant_id();
    let (Ok(forty_two), Ok(seven)) = (AccountId::new(42), AccountId::new(7)) else {
        panic!("ids should be valid");
    };
    let Ok(Some(saved)) = harness.accounts.inner.find_account(tenant_id, forty_two).await else {
        panic!("account 42 should exist");
    };
    let Ok(Some(untouched)) = harness.accounts.inner.find_account(tenant_id, seven).await else {
        panic!("account 7 should exist");
    };
    assert_eq!(saved.name, "Renamed");
    assert_eq!(untouched.name, "Account 6");
}

#[tokio::test]
async fn update_missing_account_is_not_found() {
    let harness = Harness::everything();

    let response = merge(
        update_account_handler(
            State(harness.state.clone()),
            Extension(harness.context.clone()),
            Path("5".to_owned()),
            Ok(request_body("Ghost", None)),
        )
        .await,
    );

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Record not found");
    assert!(harness.actions().await.is_empty());
}

#[tokio::test]
async fn delete_records_one_event_and_returns_no_payload() {
    let harness = Harness::everything();
    harness.seed("Acme").await;

    let response = merge(
        delete_account_handler(
            State(harness.state.clone()),
            Extension(harness.context.clone()),
            Path("1".to_owned()),
        )
        .await,
    );

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"status": 200, "message": "Account deleted successfully"})
    );

    let events = harness.audit.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::AccountDelete);
    assert_eq!(
        events[0].before.as_ref().map(|before| before["name"].clone()),
        Some(json!("Acme"))
    );
}

#[tokio::test]
async fn delete_failure_escalates_to_server_error() {
    let harness = Harness::everything();

    let response = merge(
        delete_account_handler(
            State(harness.state.clone()),
            Extension(harness.context.clone()),
            Path("3".to_owned()),
        )
        .await,
    );

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(harness.actions().await.is_empty());
}

#[tokio::test]
async fn negative_limit_is_rejected_before_the_service() {
    let harness = Harness::everything();

    let response = merge(
        list_accounts_handler(
            State(harness.state.clone()),
            Extension(harness.context.clone()),
            Query(vec![("limit".to_owned(), "-5".to_owned())]),
        )
        .await,
    );

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["kind"], "validation");
    assert_eq!(harness.accounts.calls(), 0);
    assert!(harness.actions().await.is_empty());
}

#[tokio::test]
async fn list_returns_page_with_total() {
    let harness = Harness::everything();
    for name in ["Acme", "Globex", "Initech"] {
        harness.seed(name).await;
    }

    let response = merge(
        list_accounts_handler(
            State(harness.state.clone()),
            Extension(harness.context.clone()),
            Query(vec![
                ("accounts.limit".to_owned(), "2".to_owned()),
                ("limit".to_owned(), "1".to_owned()),
                ("sort".to_owned(), "-name".to_owned()),
            ]),
        )
        .await,
    );

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "List of accounts");
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["items"][0]["name"], "Initech");
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(harness.actions().await, vec![AuditAction::AccountList]);
}

#[tokio::test]
async fn export_of_empty_set_streams_workbook() {
    let harness = Harness::everything();

    let response = merge(
        export_accounts_handler(
            State(harness.state.clone()),
            Extension(harness.context.clone()),
            no_params(),
        )
        .await,
    );

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE),
        Some(&header::HeaderValue::from_static("application/octet-stream"))
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION),
        Some(&header::HeaderValue::from_static(
            "attachment; filename=account.xlsx"
        ))
    );
    let Ok(bytes) = to_bytes(response.into_body(), usize::MAX).await else {
        panic!("body should be readable");
    };
    assert!(bytes.starts_with(b"PK"));
    assert_eq!(harness.actions().await, vec![AuditAction::AccountExcel]);
}

#[tokio::test]
async fn export_requires_excel_capability() {
    let harness = Harness::new(&[Permission::AccountRead, Permission::AccountWrite]);

    let response = merge(
        export_accounts_handler(
            State(harness.state.clone()),
            Extension(harness.context.clone()),
            no_params(),
        )
        .await,
    );

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(harness.accounts.calls(), 0);
}

#[tokio::test]
async fn generated_code_conflict_leaves_no_row_and_no_event() {
    let harness = Harness::everything();
    let mut manual = Account::new("Manual");
    manual.code = "ACC-000002".to_owned();
    let Ok(_) = harness
        .accounts
        .inner
        .insert_account(harness.tenant_id(), manual)
        .await
    else {
        panic!("seeding should succeed");
    };

    let response = merge(
        create_account_handler(
            State(harness.state.clone()),
            Extension(harness.context.clone()),
            Query(vec![("accounts.auto_code".to_owned(), "true".to_owned())]),
            Ok(request_body("Auto", None)),
        )
        .await,
    );

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(harness.actions().await.is_empty());

    let Ok(page) = harness
        .accounts
        .inner
        .list_accounts(
            harness.tenant_id(),
            &AccountQuery {
                filters: Vec::new(),
                sort: Vec::new(),
                search: None,
                pagination: None,
            },
        )
        .await
    else {
        panic!("listing should succeed");
    };
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "Manual");
}

#[tokio::test]
async fn unavailable_audit_store_does_not_fail_update() {
    let harness = Harness::with_unavailable_audit();
    harness.seed("Acme").await;

    let response = merge(
        update_account_handler(
            State(harness.state.clone()),
            Extension(harness.context.clone()),
            Path("1".to_owned()),
            Ok(request_body("Acme Corp", None)),
        )
        .await,
    );

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["name"], "Acme Corp");
}

#[tokio::test]
async fn unavailable_audit_store_does_not_fail_delete() {
    let harness = Harness::with_unavailable_audit();
    harness.seed("Acme").await;

    let response = merge(
        delete_account_handler(
            State(harness.state.clone()),
            Extension(harness.context.clone()),
            Path("1".to_owned()),
        )
        .await,
    );

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"status": 200, "message": "Account deleted successfully"})
    );
}
