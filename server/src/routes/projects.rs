use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};

use crate::handlers::project_handlers::{
    categories, create_project, delete_project, get_project, list_projects, update_project,
    user_projects,
};
use crate::middleware::auth_middleware::auth_middleware;
use crate::state::AppState;

/// Catalogue routes, mounted at `/api`. Reads are public; writes need a
/// session.
pub fn project_routes(state: AppState) -> Router {
    let protected = Router::new()
        .route("/projects", post(create_project))
        .route("/projects/{id}", put(update_project).delete(delete_project))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/categories", get(categories))
        .route("/projects", get(list_projects))
        .route("/projects/{id}", get(get_project))
        .route("/users/{id}/projects", get(user_projects))
        .merge(protected)
        .with_state(state)
}
