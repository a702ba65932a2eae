use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Redirect,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_cookies::cookie::{time, SameSite};
use tower_cookies::{Cookie, Cookies};

use super::jwt::{generate_token, SESSION_TTL_HOURS};
use crate::errors::{ApiError, ApiResult};
use crate::middleware::auth_middleware::{read_session, CurrentSession, SESSION_COOKIE};
use crate::models::Session;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// GET /auth/providers
pub async fn providers(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "google": {
            "id": "google",
            "name": "Google",
            "type": "oauth",
            "signInUrl": "/auth/signin/google",
            "callbackUrl": state.oauth.redirect_url(),
        }
    }))
}

/// GET /auth/signin/google
pub async fn signin(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.oauth.authorize_url())
}

fn denied(state: &AppState) -> Redirect {
    Redirect::to(&format!(
        "{}/?error=AccessDenied",
        state.config.client_url.trim_end_matches('/')
    ))
}

/// GET /auth/callback/google
pub async fn callback(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(params): Query<CallbackParams>,
) -> ApiResult<Redirect> {
    if let Some(error) = params.error {
        tracing::warn!("Provider refused sign-in: {}", error);
        return Ok(denied(&state));
    }
    let (Some(code), Some(csrf_state)) = (params.code, params.state) else {
        return Ok(denied(&state));
    };
    if !state.oauth.take_state(&csrf_state) {
        tracing::warn!("Sign-in callback with unknown or expired state");
        return Ok(denied(&state));
    }

    let profile = match state.oauth.exchange_code(&code).await {
        Ok(access_token) => state.oauth.fetch_profile(&access_token).await,
        Err(e) => Err(e),
    };
    let profile = match profile {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!("OAuth callback failed: {}", e);
            return Ok(denied(&state));
        }
    };

    if !state.identity.sign_in(&profile).await {
        return Ok(denied(&state));
    }
    let Some(email) = profile.email.as_deref() else {
        return Ok(denied(&state));
    };

    let token = generate_token(&profile, email, &state.config.session_secret)?;
    cookies.add(
        Cookie::build((SESSION_COOKIE, token))
            .http_only(true)
            .path("/")
            .same_site(SameSite::Lax)
            .secure(state.config.is_production)
            .max_age(time::Duration::hours(SESSION_TTL_HOURS))
            .build(),
    );

    Ok(Redirect::to(&state.config.client_url))
}

/// POST /auth/signout
pub async fn signout(cookies: Cookies) -> Json<Value> {
    cookies.remove(Cookie::build(SESSION_COOKIE).path("/").build());
    Json(json!({ "message": "signed out" }))
}

/// GET /api/auth/session
///
/// `null` when nobody is signed in.
pub async fn session(
    State(state): State<AppState>,
    cookies: Cookies,
    headers: HeaderMap,
) -> Json<Option<Session>> {
    let Some(current) = read_session(&cookies, &headers, &state.config.session_secret) else {
        return Json(None);
    };

    let session = Session {
        user: current.claims.session_user(),
        expires: current.claims.expires_at(),
        synced: false,
    };
    Json(Some(state.identity.materialize(session).await))
}

/// GET /api/auth/token
pub async fn token(Extension(session): Extension<CurrentSession>) -> Json<Value> {
    Json(json!({ "token": session.token }))
}

/// Resolve the application user id behind the current session.
pub async fn current_user_id(state: &AppState, session: &CurrentSession) -> ApiResult<String> {
    state
        .identity
        .find_user(&session.claims.email)
        .await?
        .map(|user| user.id)
        .ok_or(ApiError::Unauthorized)
}
