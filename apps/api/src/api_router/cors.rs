use axum::http::header::{ACCEPT_LANGUAGE, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use sigma_core::AppError;
use tower_http::cors::CorsLayer;

use crate::middleware::{DISPLAY_NAME_HEADER, SUBJECT_HEADER, TENANT_HEADER};

pub(super) fn build_cors_layer(frontend_url: &str) -> Result<CorsLayer, AppError> {
    Ok(CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            ACCEPT_LANGUAGE,
            HeaderName::from_static(SUBJECT_HEADER),
            HeaderName::from_static(TENANT_HEADER),
            HeaderName::from_static(DISPLAY_NAME_HEADER),
        ])
        .expose_headers([axum::http::header::CONTENT_DISPOSITION]))
}

#[cfg(test)]
mod tests {
    use super::build_cors_layer;

    #[test]
    fn rejects_unparseable_origin() {
        assert!(build_cors_layer("http://bad\norigin").is_err());
        assert!(build_cors_layer("http://localhost:3000").is_ok());
    }
}
