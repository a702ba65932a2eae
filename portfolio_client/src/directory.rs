use async_trait::async_trait;

use crate::error::ClientResult;
use crate::models::{NewUser, UserProfile};

/// Outcome of [`UserDirectory::ensure_user`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnsuredUser {
    pub user: UserProfile,
    pub created: bool,
}

/// Lookup and creation of application users, keyed by email.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> ClientResult<Option<UserProfile>>;

    async fn create_user(&self, new_user: &NewUser) -> ClientResult<UserProfile>;

    /// Idempotent "make sure this email has a user".
    ///
    /// A failed creation is followed by one more lookup: when a concurrent
    /// sign-in already inserted the (unique) email, that record is returned.
    async fn ensure_user(&self, new_user: &NewUser) -> ClientResult<EnsuredUser> {
        if let Some(user) = self.find_user_by_email(&new_user.email).await? {
            return Ok(EnsuredUser {
                user,
                created: false,
            });
        }

        match self.create_user(new_user).await {
            Ok(user) => {
                tracing::info!("Created user for {}", new_user.email);
                Ok(EnsuredUser {
                    user,
                    created: true,
                })
            }
            Err(create_err) => match self.find_user_by_email(&new_user.email).await {
                Ok(Some(user)) => {
                    tracing::debug!("User {} appeared concurrently", new_user.email);
                    Ok(EnsuredUser {
                        user,
                        created: false,
                    })
                }
                _ => Err(create_err),
            },
        }
    }
}
