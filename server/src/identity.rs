//! Reconciles the OAuth identity with the application user stored in the
//! backend.

use std::sync::Arc;

use portfolio_client::{ClientResult, NewUser, UserDirectory, UserProfile};

use crate::models::{OAuthProfile, Session};

#[derive(Clone)]
pub struct IdentityBridge {
    directory: Arc<dyn UserDirectory>,
}

impl IdentityBridge {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Permit or deny a sign-in attempt. The application user is created on
    /// first sign-in; any lookup or creation failure denies.
    pub async fn sign_in(&self, profile: &OAuthProfile) -> bool {
        let Some(email) = profile.email.as_deref().filter(|e| !e.is_empty()) else {
            tracing::warn!("Sign-in denied: provider returned no email for {}", profile.sub);
            return false;
        };

        let new_user = NewUser {
            name: profile.name.clone().unwrap_or_else(|| email.to_string()),
            email: email.to_string(),
            avatar_url: profile.image.clone().unwrap_or_default(),
        };

        match self.directory.ensure_user(&new_user).await {
            Ok(ensured) => {
                tracing::info!(created = ensured.created, "Sign-in permitted for {}", email);
                true
            }
            Err(e) => {
                tracing::error!("Sign-in denied for {}: {}", email, e);
                false
            }
        }
    }

    pub async fn find_user(&self, email: &str) -> ClientResult<Option<UserProfile>> {
        self.directory.find_user_by_email(email).await
    }

    /// Overlay the stored profile on the OAuth session. When the lookup
    /// fails the OAuth session is served as-is with `synced = false`.
    pub async fn materialize(&self, mut session: Session) -> Session {
        match self.directory.find_user_by_email(&session.user.email).await {
            Ok(Some(stored)) => {
                session.user = session.user.merge(stored);
                session.synced = true;
            }
            Ok(None) => {
                session.synced = true;
            }
            Err(e) => {
                tracing::warn!("Error retrieving user data for {}: {}", session.user.email, e);
                session.synced = false;
            }
        }
        session
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use portfolio_client::ClientError;

    use super::*;
    use crate::models::SessionUser;

    /// In-memory user store that counts calls.
    #[derive(Default)]
    pub(crate) struct FakeDirectory {
        pub users: Mutex<Vec<UserProfile>>,
        pub lookups: AtomicUsize,
        pub creates: AtomicUsize,
        pub fail_lookups: AtomicBool,
    }

    impl FakeDirectory {
        pub(crate) fn with_user(user: UserProfile) -> Self {
            let directory = Self::default();
            directory.users.lock().unwrap().push(user);
            directory
        }
    }

    #[async_trait]
    impl UserDirectory for FakeDirectory {
        async fn find_user_by_email(&self, email: &str) -> ClientResult<Option<UserProfile>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail_lookups.load(Ordering::SeqCst) {
                return Err(ClientError::Status(503));
            }
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn create_user(&self, new_user: &NewUser) -> ClientResult<UserProfile> {
            let n = self.creates.fetch_add(1, Ordering::SeqCst);
            let user = UserProfile {
                id: format!("u{}", n + 100),
                name: new_user.name.clone(),
                email: new_user.email.clone(),
                avatar_url: new_user.avatar_url.clone(),
                description: None,
                github_url: None,
                linked_in: None,
            };
            self.users.lock().unwrap().push(user.clone());
            Ok(user)
        }
    }

    pub(crate) fn stored_ada() -> UserProfile {
        UserProfile {
            id: "u1".to_string(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            avatar_url: "https://lh3.googleusercontent.com/ada".to_string(),
            description: Some("First programmer".to_string()),
            github_url: None,
            linked_in: Some("https://linkedin.com/in/ada".to_string()),
        }
    }

    fn profile(email: Option<&str>) -> OAuthProfile {
        OAuthProfile {
            sub: "google-1".to_string(),
            name: Some("Ada".to_string()),
            email: email.map(str::to_string),
            image: Some("https://lh3.googleusercontent.com/ada".to_string()),
        }
    }

    fn oauth_session() -> Session {
        Session {
            user: SessionUser {
                name: Some("Ada".to_string()),
                email: "ada@example.com".to_string(),
                image: Some("https://lh3.googleusercontent.com/ada".to_string()),
                id: None,
                avatar_url: None,
                description: None,
                github_url: None,
                linked_in: None,
            },
            expires: Utc::now(),
            synced: false,
        }
    }

    #[tokio::test]
    async fn new_email_creates_exactly_once() {
        let directory = Arc::new(FakeDirectory::default());
        let bridge = IdentityBridge::new(directory.clone());

        assert!(bridge.sign_in(&profile(Some("new@example.com"))).await);
        assert_eq!(directory.creates.load(Ordering::SeqCst), 1);
        assert_eq!(directory.users.lock().unwrap()[0].name, "Ada");
    }

    #[tokio::test]
    async fn existing_email_creates_nothing() {
        let directory = Arc::new(FakeDirectory::with_user(stored_ada()));
        let bridge = IdentityBridge::new(directory.clone());

        assert!(bridge.sign_in(&profile(Some("ada@example.com"))).await);
        assert_eq!(directory.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn lookup_failure_denies() {
        let directory = Arc::new(FakeDirectory::default());
        directory.fail_lookups.store(true, Ordering::SeqCst);
        let bridge = IdentityBridge::new(directory.clone());

        assert!(!bridge.sign_in(&profile(Some("ada@example.com"))).await);
        assert_eq!(directory.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_email_denies_without_calls() {
        let directory = Arc::new(FakeDirectory::default());
        let bridge = IdentityBridge::new(directory.clone());

        assert!(!bridge.sign_in(&profile(None)).await);
        assert_eq!(directory.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn session_merges_stored_profile() {
        let bridge = IdentityBridge::new(Arc::new(FakeDirectory::with_user(stored_ada())));

        let session = bridge.materialize(oauth_session()).await;

        assert!(session.synced);
        assert_eq!(session.user.id.as_deref(), Some("u1"));
        assert_eq!(session.user.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(session.user.description.as_deref(), Some("First programmer"));
        assert_eq!(session.user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn session_falls_back_to_oauth_fields_on_failure() {
        let directory = FakeDirectory::with_user(stored_ada());
        directory.fail_lookups.store(true, Ordering::SeqCst);
        let bridge = IdentityBridge::new(Arc::new(directory));
        let original = oauth_session();

        let session = bridge.materialize(original.clone()).await;

        assert!(!session.synced);
        assert_eq!(session.user, original.user);
        assert_eq!(session.user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn unknown_user_keeps_oauth_session() {
        let bridge = IdentityBridge::new(Arc::new(FakeDirectory::default()));
        let original = oauth_session();

        let session = bridge.materialize(original.clone()).await;

        assert!(session.synced);
        assert_eq!(session.user, original.user);
    }
}
