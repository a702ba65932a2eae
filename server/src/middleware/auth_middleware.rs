use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::errors::ErrorKind;
use tower_cookies::Cookies;

use crate::errors::ApiError;
use crate::handlers::jwt::{verify_token, Claims};
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "portfolio.session";

/// Verified session, available to handlers behind [`auth_middleware`].
#[derive(Clone, Debug)]
pub struct CurrentSession {
    pub token: String,
    pub claims: Claims,
}

fn verify(token: String, secret: &str) -> Option<CurrentSession> {
    match verify_token(&token, secret) {
        Ok(data) => Some(CurrentSession {
            token,
            claims: data.claims,
        }),
        Err(e) => {
            match *e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("Session token expired"),
                _ => tracing::warn!("Invalid session token: {}", e),
            }
            None
        }
    }
}

/// Session token from the cookie, or from an `Authorization: Bearer` header
/// for API clients that fetched it from `/api/auth/token`. A cookie that
/// fails verification does not hide a valid bearer.
pub fn read_session(cookies: &Cookies, headers: &HeaderMap, secret: &str) -> Option<CurrentSession> {
    let from_cookie = cookies
        .get(SESSION_COOKIE)
        .and_then(|c| verify(c.value().to_string(), secret));
    if from_cookie.is_some() {
        return from_cookie;
    }

    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))?;
    verify(bearer.to_string(), secret)
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(session) = read_session(&cookies, req.headers(), &state.config.session_secret) else {
        return ApiError::Unauthorized.into_response();
    };

    req.extensions_mut().insert(session);
    next.run(req).await
}
