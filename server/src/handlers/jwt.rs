use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

use crate::models::{OAuthProfile, SessionUser};

/// The backend's JWT provider only accepts tokens from this issuer.
pub const ISSUER: &str = "grafbase";

pub const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: Option<String>,
    pub email: String,
    pub picture: Option<String>,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn session_user(&self) -> SessionUser {
        SessionUser {
            name: self.name.clone(),
            email: self.email.clone(),
            image: self.picture.clone(),
            id: None,
            avatar_url: None,
            description: None,
            github_url: None,
            linked_in: None,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// Sign a session token for a profile that passed sign-in. The profile must
/// carry an email.
pub fn generate_token(
    profile: &OAuthProfile,
    email: &str,
    secret: &str,
) -> jsonwebtoken::errors::Result<String> {
    let now = Utc::now();
    let exp = now + chrono::Duration::hours(SESSION_TTL_HOURS);

    let claims = Claims {
        sub: profile.sub.clone(),
        name: profile.name.clone(),
        email: email.to_string(),
        picture: profile.image.clone(),
        iss: ISSUER.to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> jsonwebtoken::errors::Result<TokenData<Claims>> {
    let mut validation = Validation::default();
    validation.set_issuer(&[ISSUER]);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::errors::ErrorKind;

    use super::*;

    fn profile() -> OAuthProfile {
        OAuthProfile {
            sub: "google-123".to_string(),
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            image: Some("https://lh3.googleusercontent.com/ada".to_string()),
        }
    }

    #[test]
    fn token_carries_profile_and_issuer() {
        let token = generate_token(&profile(), "ada@example.com", "secret").unwrap();
        let data = verify_token(&token, "secret").unwrap();

        assert_eq!(data.claims.iss, ISSUER);
        assert_eq!(data.claims.email, "ada@example.com");
        assert_eq!(data.claims.exp - data.claims.iat, SESSION_TTL_HOURS * 3600);
        assert_eq!(data.claims.session_user().image, profile().image);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_token(&profile(), "ada@example.com", "secret").unwrap();
        let err = verify_token(&token, "other").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidSignature);
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "x".to_string(),
            name: None,
            email: "x@example.com".to_string(),
            picture: None,
            iss: "someone-else".to_string(),
            iat: now,
            exp: now + 60,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(verify_token(&token, "secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "x".to_string(),
            name: None,
            email: "x@example.com".to_string(),
            picture: None,
            iss: ISSUER.to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        let err = verify_token(&token, "secret").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::ExpiredSignature);
    }
}
