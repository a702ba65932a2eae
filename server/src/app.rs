use axum::{
    http::{header, header::InvalidHeaderValue, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::routes::{
    auth::{auth_routes, session_routes},
    projects::project_routes,
};
use crate::state::AppState;

fn cors_layer(client_url: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    Ok(CorsLayer::new()
        .allow_origin(client_url.trim_end_matches('/').parse::<HeaderValue>()?)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::COOKIE, header::AUTHORIZATION])
        .allow_credentials(true))
}

pub fn build_router(state: AppState) -> Result<Router, InvalidHeaderValue> {
    let cors = cors_layer(&state.config.client_url)?;

    Ok(Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/api/auth", session_routes(state.clone()))
        .nest("/api", project_routes(state))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}
