use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sigma_application::{AuditRecord, QueryDefaults, resolve_query};
use sigma_domain::{
    AccountField, AccountId, AuditAction, MessageKey, Permission, QueryDescriptor, SortDirection,
};
use tracing::{debug, error};

use crate::dto::{AccountPageResponse, AccountRequest, AccountResponse};
use crate::error::ErrorResponse;
use crate::middleware::RequestContext;
use crate::response::ResponseEnvelope;
use crate::state::AppState;

mod export;

pub use export::export_accounts_handler;

const THIS_ACCOUNT: &str = "account";
const THIS_ACCOUNTS: &str = "accounts";

/// Terminal response of one pipeline step.
type Step<T> = Result<T, Response>;

/// Either branch is a complete response.
pub type PipelineResult = Result<Response, Response>;

pub async fn find_account_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path(raw_id): Path<String>,
) -> PipelineResult {
    ensure_allowed(&state, &context, Permission::AccountRead).await?;
    let id = parse_account_id(&state, &context, raw_id.as_str())?;

    let account = state
        .account_service
        .find_by_id(&context.actor, id)
        .await
        .map_err(|error| {
            ResponseEnvelope::failure_with(
                StatusCode::NOT_FOUND,
                translate(&state, &context, MessageKey::RecordNotFound, &[]),
                &error,
            )
            .into_response()
        })?;

    state
        .audit_recorder
        .record(
            &context.actor,
            AuditRecord::new(AuditAction::AccountView, THIS_ACCOUNT).resource_id(id),
        )
        .await;

    Ok(ResponseEnvelope::success(
        translate(&state, &context, MessageKey::VInfo, &[THIS_ACCOUNT]),
        AccountResponse::from(account),
    )
    .into_response())
}

pub async fn list_accounts_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Query(params): Query<Vec<(String, String)>>,
) -> PipelineResult {
    ensure_allowed(&state, &context, Permission::AccountWrite).await?;
    let query = resolve_account_query(&params)?;

    let page = state
        .account_service
        .list(&context.actor, &query)
        .await
        .map_err(|error| {
            debug!(%error, "account listing failed");
            ResponseEnvelope::from_service_error(&error).into_response()
        })?;

    state
        .audit_recorder
        .record(
            &context.actor,
            AuditRecord::new(AuditAction::AccountList, THIS_ACCOUNT),
        )
        .await;

    Ok(ResponseEnvelope::success(
        translate(&state, &context, MessageKey::ListOfV, &[THIS_ACCOUNTS]),
        AccountPageResponse::from(page),
    )
    .into_response())
}

pub async fn create_account_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Query(params): Query<Vec<(String, String)>>,
    payload: Result<Json<AccountRequest>, JsonRejection>,
) -> PipelineResult {
    ensure_allowed(&state, &context, Permission::AccountWrite).await?;
    let Json(payload) = payload.map_err(reject_body)?;
    let query = resolve_account_query(&params)?;

    let submitted = payload.into_account();
    let created = state
        .account_service
        .create(&context.actor, submitted.clone(), &query)
        .await
        .map_err(|error| ResponseEnvelope::from_service_error(&error).into_response())?;

    let mut record = AuditRecord::new(AuditAction::AccountCreate, THIS_ACCOUNT).after(&submitted);
    if let Some(id) = created.id {
        record = record.resource_id(id);
    }
    state.audit_recorder.record(&context.actor, record).await;

    Ok(ResponseEnvelope::success(
        translate(&state, &context, MessageKey::VCreatedSuccessfully, &[THIS_ACCOUNT]),
        AccountResponse::from(created),
    )
    .into_response())
}

pub async fn update_account_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path(raw_id): Path<String>,
    payload: Result<Json<AccountRequest>, JsonRejection>,
) -> PipelineResult {
    ensure_allowed(&state, &context, Permission::AccountWrite).await?;
    let id = parse_account_id(&state, &context, raw_id.as_str())?;
    let Json(payload) = payload.map_err(reject_body)?;

    if payload.id.is_some_and(|body_id| body_id != id.as_u64()) {
        debug!(path_id = %id, body_id = ?payload.id, "ignoring conflicting body id");
    }
    let submitted = payload.into_account_with_id(id);

    let before = state
        .account_service
        .find_by_id(&context.actor, id)
        .await
        .map_err(|error| {
            ResponseEnvelope::failure_with(
                StatusCode::NOT_FOUND,
                translate(&state, &context, MessageKey::RecordNotFound, &[]),
                &error,
            )
            .into_response()
        })?;

    let saved = state
        .account_service
        .save(&context.actor, submitted.clone())
        .await
        .map_err(|error| ResponseEnvelope::from_service_error(&error).into_response())?;

    state
        .audit_recorder
        .record(
            &context.actor,
            AuditRecord::new(AuditAction::AccountUpdate, THIS_ACCOUNT)
                .resource_id(id)
                .before(&before)
                .after(&submitted),
        )
        .await;

    Ok(ResponseEnvelope::success(
        translate(&state, &context, MessageKey::VUpdatedSuccessfully, &[THIS_ACCOUNT]),
        AccountResponse::from(saved),
    )
    .into_response())
}

pub async fn delete_account_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path(raw_id): Path<String>,
) -> PipelineResult {
    ensure_allowed(&state, &context, Permission::AccountWrite).await?;
    let id = parse_account_id(&state, &context, raw_id.as_str())?;

    let deleted = state
        .account_service
        .delete(&context.actor, id)
        .await
        .map_err(|error| {
            error!(account_id = %id, %error, "account deletion failed");
            ResponseEnvelope::failure_with(
                StatusCode::INTERNAL_SERVER_ERROR,
                error.to_string(),
                &error,
            )
            .into_response()
        })?;

    state
        .audit_recorder
        .record(
            &context.actor,
            AuditRecord::new(AuditAction::AccountDelete, THIS_ACCOUNT)
                .resource_id(id)
                .before(&deleted),
        )
        .await;

    Ok(ResponseEnvelope::confirmed(translate(
        &state,
        &context,
        MessageKey::VDeletedSuccessfully,
        &[THIS_ACCOUNT],
    ))
    .into_response())
}

fn translate(state: &AppState, context: &RequestContext, key: MessageKey, args: &[&str]) -> String {
    state
        .messages
        .translate(context.language.as_str(), key, args)
}

async fn ensure_allowed(
    state: &AppState,
    context: &RequestContext,
    permission: Permission,
) -> Step<()> {
    if state
        .authorization_service
        .is_allowed(&context.actor, permission)
        .await
    {
        return Ok(());
    }

    Err(ResponseEnvelope::failure(
        StatusCode::FORBIDDEN,
        translate(state, context, MessageKey::YouDontHavePermission, &[]),
    )
    .into_response())
}

#[allow(clippy::result_large_err)]
fn parse_account_id(state: &AppState, context: &RequestContext, raw_id: &str) -> Step<AccountId> {
    AccountId::from_transport(raw_id).map_err(|error| {
        ResponseEnvelope::failure_with(
            StatusCode::BAD_REQUEST,
            translate(state, context, MessageKey::InvalidId, &[]),
            &error,
        )
        .into_response()
    })
}

fn account_query_defaults() -> QueryDefaults {
    QueryDefaults::new(AccountField::names()).with_sort(AccountField::Id.as_str(), SortDirection::Asc)
}

#[allow(clippy::result_large_err)]
fn resolve_account_query(params: &[(String, String)]) -> Step<QueryDescriptor> {
    resolve_query(params, THIS_ACCOUNTS, &account_query_defaults())
        .map_err(|error| ResponseEnvelope::from_service_error(&error).into_response())
}

fn reject_body(rejection: JsonRejection) -> Response {
    ErrorResponse::respond(StatusCode::NOT_ACCEPTABLE, rejection.body_text())
}

#[cfg(test)]
mod tests;
