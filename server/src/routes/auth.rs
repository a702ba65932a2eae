use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::handlers::auth_handlers::{callback, providers, session, signin, signout, token};
use crate::middleware::auth_middleware::auth_middleware;
use crate::state::AppState;

/// Browser-facing sign-in flow, mounted at `/auth`.
pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/providers", get(providers))
        .route("/signin/google", get(signin))
        .route("/callback/google", get(callback))
        .route("/signout", post(signout))
        .with_state(state)
}

/// Session endpoints, mounted at `/api/auth`.
pub fn session_routes(state: AppState) -> Router {
    let protected = Router::new()
        .route("/token", get(token))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/session", get(session))
        .merge(protected)
        .with_state(state)
}
