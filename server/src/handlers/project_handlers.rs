use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use portfolio_client::{Project, ProjectConnection, ProjectForm, UserWithProjects, CATEGORIES};
use serde::Deserialize;
use serde_json::{json, Value};

use super::auth_handlers::current_user_id;
use crate::errors::{ApiError, ApiResult};
use crate::middleware::auth_middleware::CurrentSession;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    pub endcursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserProjectsParams {
    pub last: Option<u32>,
}

/// GET /api/categories
pub async fn categories() -> Json<&'static [&'static str]> {
    Json(CATEGORIES)
}

/// GET /api/projects
pub async fn list_projects(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<ProjectConnection>> {
    let category = params.category.as_deref().filter(|c| !c.is_empty());
    let cursor = params.endcursor.as_deref().filter(|c| !c.is_empty());
    let page = state.client.fetch_all_projects(category, cursor).await?;
    Ok(Json(page))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Project>> {
    state
        .client
        .get_project_details(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Project"))
}

/// GET /api/users/{id}/projects
pub async fn user_projects(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<UserProjectsParams>,
) -> ApiResult<Json<UserWithProjects>> {
    state
        .client
        .get_user_projects(&id, params.last)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("User"))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Json(form): Json<ProjectForm>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    form.validate()?;
    let creator_id = current_user_id(&state, &session).await?;

    let project = state
        .client
        .create_new_project(&form, &creator_id, &session.token)
        .await?;
    tracing::info!("Project {} created by {}", project.id, creator_id);

    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /api/projects/{id}
pub async fn update_project(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Path(id): Path<String>,
    Json(form): Json<ProjectForm>,
) -> ApiResult<Json<Project>> {
    form.validate()?;
    let project = state
        .client
        .update_project(&form, &id, &session.token)
        .await?;
    Ok(Json(project))
}

/// DELETE /api/projects/{id}
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let deleted_id = state.client.delete_project(&id, &session.token).await?;
    tracing::info!("Project {} deleted by {}", deleted_id, session.claims.email);
    Ok(Json(json!({ "deletedId": deleted_id })))
}
