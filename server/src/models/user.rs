use chrono::{DateTime, Utc};
use portfolio_client::UserProfile;
use serde::{Deserialize, Serialize};

/// What the identity provider tells us about the person signing in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OAuthProfile {
    pub sub: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

/// User half of a session: the OAuth fields, plus the stored profile fields
/// once they have been merged in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub name: Option<String>,
    pub email: String,
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_in: Option<String>,
}

impl SessionUser {
    /// Shallow merge: every stored field wins over the OAuth value, fields
    /// only the provider knows (`image`) stay.
    pub fn merge(self, stored: UserProfile) -> Self {
        SessionUser {
            name: Some(stored.name),
            email: stored.email,
            image: self.image,
            id: Some(stored.id),
            avatar_url: Some(stored.avatar_url),
            description: stored.description,
            github_url: stored.github_url,
            linked_in: stored.linked_in,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    pub expires: DateTime<Utc>,
    /// False when the stored profile could not be fetched and only the OAuth
    /// fields are present.
    pub synced: bool,
}
