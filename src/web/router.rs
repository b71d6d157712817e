//! Router configuration for the admin API.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_user, get_settings, get_user, get_version, list_error_log, provision_user,
    test_connection, update_settings, AppState,
};
use super::middleware::admin_auth;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let user_routes = Router::new()
        .route("/", post(create_user))
        .route("/:name", get(get_user))
        .route("/:name/provision", post(provision_user));

    let diagnostics_routes = Router::new()
        .route("/connection", get(test_connection))
        .route("/version", get(get_version));

    let api_routes = Router::new()
        .route("/settings", get(get_settings).put(update_settings))
        .route("/error-log", get(list_error_log))
        .nest("/users", user_routes)
        .nest("/diagnostics", diagnostics_routes);

    let admin_token = app_state.admin_token.clone();
    let api_routes = api_routes.route_layer(middleware::from_fn(move |req, next| {
        let token = admin_token.clone();
        admin_auth(token, req, next)
    }));

    Router::new()
        .nest("/api", api_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Full application: API routes plus health check.
pub fn create_app(app_state: Arc<AppState>) -> Router {
    create_router(app_state).merge(create_health_router())
}
