use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use sigma_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route(
            "/api/accounts",
            get(handlers::accounts::list_accounts_handler)
                .post(handlers::accounts::create_account_handler),
        )
        .route(
            "/api/accounts/excel",
            get(handlers::accounts::export_accounts_handler),
        )
        .route(
            "/api/accounts/{account_id}",
            get(handlers::accounts::find_account_handler)
                .put(handlers::accounts::update_account_handler)
                .delete(handlers::accounts::delete_account_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_identity,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
