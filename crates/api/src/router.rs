use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{AppState, auth_handlers, middleware as auth_middleware};

pub fn router(state: Arc<AppState>) -> Router {
    // Public credential-lifecycle routes, namespaced by account kind
    // where the flow is kind-specific.
    let public_routes = Router::new()
        .route("/", get(|| async { "Flockkit credential API running" }))
        .route("/{kind}/register", post(auth_handlers::register))
        .route("/{kind}/login", post(auth_handlers::login))
        .route(
            "/{kind}/request-password-reset",
            post(auth_handlers::request_password_reset),
        )
        .route("/reset-password", post(auth_handlers::reset_password))
        .route("/verify/{token}", get(auth_handlers::verify_email));

    // Bearer-protected routes.
    let protected_routes = Router::new()
        .route("/me", get(auth_handlers::me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
