pub mod user;

pub use user::{OAuthProfile, Session, SessionUser};
