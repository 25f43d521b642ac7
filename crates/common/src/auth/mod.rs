//! Authentication utilities
//!
//! Provides:
//! - Argon2 password hashing and verification
//! - Session login/logout helpers (user_id/user_name keys)
//! - An extractor giving handlers the current user, if any

use crate::errors::{AppError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session key for the authenticated user's id
pub const USER_ID_KEY: &str = "user_id";

/// Session key for the authenticated user's display name
pub const USER_NAME_KEY: &str = "user_name";

/// The authenticated user attached to a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i32,
    pub name: String,
}

/// Hash a password for storage (PHC string)
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal {
            message: format!("password hashing failed: {}", e),
        })
}

/// Verify a password against a stored PHC hash
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Read the authenticated user from the session, if both keys are present
pub async fn current_user(session: &Session) -> Result<Option<SessionUser>> {
    let id: Option<i32> = session.get(USER_ID_KEY).await?;
    let name: Option<String> = session.get(USER_NAME_KEY).await?;

    Ok(match (id, name) {
        (Some(id), Some(name)) => Some(SessionUser { id, name }),
        _ => None,
    })
}

/// Mark the session as authenticated. The session id is cycled first so a
/// pre-login cookie cannot be replayed into the authenticated session.
pub async fn login(session: &Session, user_id: i32, user_name: &str) -> Result<()> {
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user_id).await?;
    session.insert(USER_NAME_KEY, user_name).await?;
    Ok(())
}

/// Drop the session entirely
pub async fn logout(session: &Session) -> Result<()> {
    session.flush().await?;
    Ok(())
}

/// Extractor: the current user, or `None` for anonymous visitors.
/// Handlers decide themselves how to treat anonymity (the comment form,
/// for example, renders a login prompt instead of rejecting the request).
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal {
                message: format!("session layer missing: {}", msg),
            })?;

        Ok(MaybeUser(current_user(&session).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("s3cret-passw0rd").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret-passw0rd", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }
}
