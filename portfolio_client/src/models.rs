use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::upload::is_base64_data_url;

/// Categories offered by the catalogue filter.
pub const CATEGORIES: &[&str] = &[
    "Frontend",
    "Backend",
    "Full-Stack",
    "Mobile",
    "UI/UX",
    "Game Dev",
    "DevOps",
    "Data Science",
    "Machine Learning",
    "Cybersecurity",
    "Blockchain",
    "E-commerce",
    "Chatbots",
];

/// Application user as stored in the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub linked_in: Option<String>,
}

/// Input for `userCreate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub avatar_url: String,
}

/// The `createdBy` side of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub live_site_url: String,
    pub github_url: String,
    pub category: String,
    #[serde(default)]
    pub created_by: Option<Creator>,
}

/// Short project card used on profile pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: String,
    pub title: String,
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_previous_page: bool,
    pub has_next_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge<N> {
    pub node: N,
}

/// Cursor-paginated list as returned by Grafbase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "N: Deserialize<'de>"))]
pub struct Connection<N> {
    #[serde(default)]
    pub page_info: PageInfo,
    #[serde(default)]
    pub edges: Vec<Edge<N>>,
}

impl<N> Connection<N> {
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.edges.iter().map(|edge| &edge.node)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

pub type ProjectConnection = Connection<Project>;

/// A user together with their latest projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserWithProjects {
    #[serde(flatten)]
    pub user: UserProfile,
    #[serde(default)]
    pub projects: Option<Connection<ProjectSummary>>,
}

/// Project fields as submitted from the create/edit form.
///
/// `image` holds either a hosted URL or an inline
/// `data:image/<type>;base64,` payload that still has to be uploaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectForm {
    pub title: String,
    pub description: String,
    pub image: String,
    pub live_site_url: String,
    pub github_url: String,
    pub category: String,
}

impl ProjectForm {
    /// Check the constraints the backend schema declares, before any request
    /// leaves the process.
    pub fn validate(&self) -> ClientResult<()> {
        if self.title.trim().chars().count() < 3 {
            return Err(ClientError::Validation(
                "title must be at least 3 characters".to_string(),
            ));
        }
        if self.description.trim().is_empty() {
            return Err(ClientError::Validation("description is required".to_string()));
        }
        if self.image.is_empty() {
            return Err(ClientError::Validation("image is required".to_string()));
        }
        if !is_base64_data_url(&self.image) {
            ensure_web_url("image", &self.image)?;
        }
        ensure_web_url("liveSiteUrl", &self.live_site_url)?;
        ensure_web_url("githubUrl", &self.github_url)?;
        if !CATEGORIES.contains(&self.category.as_str()) {
            return Err(ClientError::Validation(format!(
                "unknown category '{}'",
                self.category
            )));
        }
        Ok(())
    }
}

fn ensure_web_url(field: &str, value: &str) -> ClientResult<()> {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(()),
        _ => Err(ClientError::Validation(format!(
            "{} must be an http(s) URL",
            field
        ))),
    }
}
