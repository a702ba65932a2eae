//! Data-access operations against the portfolio backend.
//!
//! Reads and user bootstrap go out with the API key; project mutations go
//! out with the caller's session token as a bearer credential.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::directory::UserDirectory;
use crate::error::ClientResult;
use crate::graphql::{Auth, GraphQLClient, RequestContext};
use crate::models::{NewUser, Project, ProjectConnection, ProjectForm, UserProfile, UserWithProjects};
use crate::queries::{
    CREATE_PROJECT_MUTATION, CREATE_USER_MUTATION, DELETE_PROJECT_MUTATION,
    GET_PROJECTS_OF_USER_QUERY, GET_PROJECT_BY_ID_QUERY, GET_USER_QUERY, PROJECTS_QUERY,
    UPDATE_PROJECT_MUTATION,
};
use crate::upload::{is_base64_data_url, ImageUploader};

/// Number of projects shown on a profile when the caller does not ask.
pub const DEFAULT_USER_PROJECTS: u32 = 4;

#[derive(Deserialize)]
struct UserData {
    user: Option<UserProfile>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserCreateData {
    user_create: UserPayload,
}

#[derive(Deserialize)]
struct UserPayload {
    user: UserProfile,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectSearchData {
    project_search: ProjectConnection,
}

#[derive(Deserialize)]
struct ProjectData {
    project: Option<Project>,
}

#[derive(Deserialize)]
struct UserProjectsData {
    user: Option<UserWithProjects>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectCreateData {
    project_create: ProjectPayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectUpdateData {
    project_update: ProjectPayload,
}

#[derive(Deserialize)]
struct ProjectPayload {
    project: Project,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectDeleteData {
    project_delete: DeletePayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeletePayload {
    deleted_id: String,
}

#[derive(Serialize)]
struct Link<'a> {
    link: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectCreateInput<'a> {
    #[serde(flatten)]
    form: ProjectForm,
    created_by: Link<'a>,
}

/// Shared handle for every backend operation.
#[derive(Clone)]
pub struct PortfolioClient {
    gql: GraphQLClient,
    endpoint: String,
    api_key: String,
    uploader: Arc<dyn ImageUploader>,
}

impl PortfolioClient {
    pub fn new(
        gql: GraphQLClient,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        uploader: Arc<dyn ImageUploader>,
    ) -> Self {
        Self {
            gql,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            uploader,
        }
    }

    fn public_context(&self) -> RequestContext {
        RequestContext::new(self.endpoint.as_str(), Auth::ApiKey(self.api_key.clone()))
    }

    fn private_context(&self, token: &str) -> RequestContext {
        RequestContext::new(self.endpoint.as_str(), Auth::Bearer(token.to_string()))
    }

    pub async fn get_user(&self, email: &str) -> ClientResult<Option<UserProfile>> {
        let data: UserData = self
            .gql
            .request(&self.public_context(), GET_USER_QUERY, json!({ "email": email }))
            .await?;
        Ok(data.user)
    }

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        avatar_url: &str,
    ) -> ClientResult<UserProfile> {
        let input = NewUser {
            name: name.to_string(),
            email: email.to_string(),
            avatar_url: avatar_url.to_string(),
        };
        let data: UserCreateData = self
            .gql
            .request(
                &self.public_context(),
                CREATE_USER_MUTATION,
                json!({ "input": input }),
            )
            .await?;
        Ok(data.user_create.user)
    }

    /// One page of projects, optionally filtered by category.
    pub async fn fetch_all_projects(
        &self,
        category: Option<&str>,
        end_cursor: Option<&str>,
    ) -> ClientResult<ProjectConnection> {
        let data: ProjectSearchData = self
            .gql
            .request(
                &self.public_context(),
                PROJECTS_QUERY,
                json!({ "category": category, "endCursor": end_cursor }),
            )
            .await?;
        Ok(data.project_search)
    }

    pub async fn get_project_details(&self, id: &str) -> ClientResult<Option<Project>> {
        let data: ProjectData = self
            .gql
            .request(&self.public_context(), GET_PROJECT_BY_ID_QUERY, json!({ "id": id }))
            .await?;
        Ok(data.project)
    }

    pub async fn get_user_projects(
        &self,
        id: &str,
        last: Option<u32>,
    ) -> ClientResult<Option<UserWithProjects>> {
        let data: UserProjectsData = self
            .gql
            .request(
                &self.public_context(),
                GET_PROJECTS_OF_USER_QUERY,
                json!({ "id": id, "last": last.unwrap_or(DEFAULT_USER_PROJECTS) }),
            )
            .await?;
        Ok(data.user)
    }

    /// Upload the form image, then create the project owned by `creator_id`.
    pub async fn create_new_project(
        &self,
        form: &ProjectForm,
        creator_id: &str,
        token: &str,
    ) -> ClientResult<Project> {
        let image = self.uploader.upload(&form.image).await?;

        let input = ProjectCreateInput {
            form: ProjectForm {
                image,
                ..form.clone()
            },
            created_by: Link { link: creator_id },
        };
        let data: ProjectCreateData = self
            .gql
            .request(
                &self.private_context(token),
                CREATE_PROJECT_MUTATION,
                json!({ "input": input }),
            )
            .await?;
        Ok(data.project_create.project)
    }

    /// Update a project. The image is re-uploaded only when the form carries
    /// a new inline image; a hosted URL is sent unchanged.
    pub async fn update_project(
        &self,
        form: &ProjectForm,
        project_id: &str,
        token: &str,
    ) -> ClientResult<Project> {
        let mut updated = form.clone();
        if is_base64_data_url(&form.image) {
            updated.image = self.uploader.upload(&form.image).await?;
        }

        let data: ProjectUpdateData = self
            .gql
            .request(
                &self.private_context(token),
                UPDATE_PROJECT_MUTATION,
                json!({ "id": project_id, "input": updated }),
            )
            .await?;
        Ok(data.project_update.project)
    }

    /// Returns the id the backend reports as deleted.
    pub async fn delete_project(&self, id: &str, token: &str) -> ClientResult<String> {
        let data: ProjectDeleteData = self
            .gql
            .request(
                &self.private_context(token),
                DELETE_PROJECT_MUTATION,
                json!({ "id": id }),
            )
            .await?;
        Ok(data.project_delete.deleted_id)
    }
}

#[async_trait]
impl UserDirectory for PortfolioClient {
    async fn find_user_by_email(&self, email: &str) -> ClientResult<Option<UserProfile>> {
        self.get_user(email).await
    }

    async fn create_user(&self, new_user: &NewUser) -> ClientResult<UserProfile> {
        PortfolioClient::create_user(self, &new_user.name, &new_user.email, &new_user.avatar_url)
            .await
    }
}
