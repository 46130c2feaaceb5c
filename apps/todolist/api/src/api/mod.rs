use axum::{Router, middleware, routing::get};
use axum_helpers::jwt_auth_middleware;

use crate::state::AppState;

pub mod health;
pub mod tasks;

/// API routes without the `/api` prefix, which `create_router` adds.
///
/// Every route here requires a valid bearer token.
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/tasks", tasks::router(state))
        .layer(middleware::from_fn_with_state(
            state.jwt_auth.clone(),
            jwt_auth_middleware,
        ))
}

/// `/ready` with a real database check; merged next to the stateless app router.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
