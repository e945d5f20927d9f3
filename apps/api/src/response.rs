use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sigma_core::AppError;
use ts_rs::TS;

/// Structured error attached to a failed envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/envelope-error.ts"
)]
pub struct EnvelopeError {
    pub kind: String,
    pub detail: String,
}

impl From<&AppError> for EnvelopeError {
    fn from(error: &AppError) -> Self {
        Self {
            kind: error.kind().to_owned(),
            detail: error.to_string(),
        }
    }
}

/// Uniform outcome of every JSON endpoint.
///
/// `status` mirrors the HTTP status code and `message` is always localized
/// unless it carries a service error verbatim.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/response-envelope.ts"
)]
pub struct ResponseEnvelope<T> {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<EnvelopeError>,
}

impl<T> ResponseEnvelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }
}

impl ResponseEnvelope<()> {
    /// Success without payload.
    pub fn confirmed(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            message: message.into(),
            data: None,
            error: None,
        }
    }

    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            data: None,
            error: None,
        }
    }

    /// Failure carrying the underlying error next to the message.
    pub fn failure_with(status: StatusCode, message: impl Into<String>, error: &AppError) -> Self {
        Self {
            error: Some(EnvelopeError::from(error)),
            ..Self::failure(status, message)
        }
    }

    /// Maps a service error with the shared policy; the message is the error itself.
    pub fn from_service_error(error: &AppError) -> Self {
        Self::failure_with(service_error_status(error), error.to_string(), error)
    }
}

/// Status for a service error when the verb does not override it.
///
/// Unexpected errors keep the client-class default.
pub fn service_error_status(error: &AppError) -> StatusCode {
    match error {
        AppError::Validation(_) | AppError::Internal(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Conflict(_) => StatusCode::CONFLICT,
        AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AppError::Forbidden(_) => StatusCode::FORBIDDEN,
    }
}

impl<T: Serialize> IntoResponse for ResponseEnvelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
