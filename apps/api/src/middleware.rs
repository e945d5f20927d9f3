use std::str::FromStr;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use sigma_core::{AppError, TenantId, UserIdentity};

use crate::error::ApiResult;
use crate::state::AppState;

pub const SUBJECT_HEADER: &str = "x-sigma-subject";
pub const TENANT_HEADER: &str = "x-sigma-tenant-id";
pub const DISPLAY_NAME_HEADER: &str = "x-sigma-display-name";

/// Caller identity and response language for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub actor: UserIdentity,
    pub language: String,
}

/// Reads the identity forwarded by the authenticating gateway.
pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let headers = request.headers();
    let subject = header_text(headers, SUBJECT_HEADER)
        .ok_or_else(|| AppError::Unauthorized("caller identity is required".to_owned()))?;
    let tenant_id = header_text(headers, TENANT_HEADER)
        .ok_or_else(|| AppError::Unauthorized("caller tenant is required".to_owned()))
        .and_then(|value| {
            TenantId::from_str(value)
                .map_err(|_| AppError::Unauthorized(format!("invalid tenant '{value}'")))
        })?;
    let display_name = header_text(headers, DISPLAY_NAME_HEADER).unwrap_or(subject);

    let context = RequestContext {
        actor: UserIdentity::new(subject, display_name, tenant_id),
        language: preferred_language(headers)
            .unwrap_or_else(|| state.default_language.clone()),
    };

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Primary subtag of the first `Accept-Language` entry.
fn preferred_language(headers: &HeaderMap) -> Option<String> {
    let first = header_text(headers, header::ACCEPT_LANGUAGE.as_str())?
        .split(',')
        .next()?;
    let tag = first.split(';').next()?.trim();
    let primary = tag.split(['-', '_']).next()?.trim();

    (!primary.is_empty() && primary != "*").then(|| primary.to_ascii_lowercase())
}
