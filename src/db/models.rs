//! # Database Models
//!
//! Row types for the tables created in `migrations/`.
//! Timestamps are RFC3339 strings; SQLite stores them as TEXT and they
//! compare correctly as strings since every value is written in UTC.

use crate::error::{AppError, AppResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// User account
///
/// The `id` is also the WebAuthn user handle, so it stays stable across
/// every passkey the user registers.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// UUID v4, e.g. "550e8400-e29b-41d4-a716-446655440000"
    pub id: String,

    /// Unique login name
    pub username: String,

    /// Shown by the authenticator during passkey creation
    pub display_name: String,

    pub created_at: String,

    pub updated_at: String,
}

impl User {
    pub fn new(username: String, display_name: String) -> Self {
        let now = Utc::now().to_rfc3339();

        Self {
            id: Uuid::new_v4().to_string(),
            username,
            display_name,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// A registered passkey
///
/// `passkey` holds the whole serialized `webauthn_rs::prelude::Passkey`,
/// which carries the public key and everything needed to verify later
/// assertions. Private keys never reach the server.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PasskeyCredential {
    /// Credential identifier derived from the authenticator's credential ID
    pub id: String,

    /// Owning user, foreign key to `users`
    pub user_id: String,

    /// JSON-serialized `Passkey`
    pub passkey: Vec<u8>,

    /// Signature counter reported by the last successful assertion
    pub counter: i64,

    pub created_at: String,

    /// Set on every successful authentication
    pub last_used_at: Option<String>,
}

/// Pending ceremony, stored in `registration_challenges` or
/// `authentication_challenges`
///
/// `challenge_state` is the serialized `PasskeyRegistration` or
/// `PasskeyAuthentication` needed to verify the authenticator's response.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Challenge {
    pub id: String,
    pub user_id: String,
    pub challenge_state: Vec<u8>,
    pub created_at: String,
    pub expires_at: String,
}

impl Challenge {
    /// ## Errors
    /// - Internal: `ttl` reaches past the representable date range
    pub fn new(user_id: String, challenge_state: Vec<u8>, ttl: Duration) -> AppResult<Self> {
        let (created_at, expires_at) = validity_window(ttl)?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            challenge_state,
            created_at,
            expires_at,
        })
    }
}

fn validity_window(ttl: Duration) -> AppResult<(String, String)> {
    let now = Utc::now();
    let expires_at = chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| AppError::Internal(format!("Challenge TTL out of range: {:?}", ttl)))?;

    Ok((now.to_rfc3339(), expires_at.to_rfc3339()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn challenge_expires_after_ttl() {
        let challenge =
            Challenge::new("user".into(), vec![1, 2, 3], Duration::from_secs(300)).unwrap();

        let created = DateTime::parse_from_rfc3339(&challenge.created_at).unwrap();
        let expires = DateTime::parse_from_rfc3339(&challenge.expires_at).unwrap();
        assert_eq!((expires - created).num_seconds(), 300);
    }

    #[test]
    fn ttl_past_the_calendar_is_an_error() {
        let result = Challenge::new(
            "user".into(),
            vec![],
            Duration::from_secs(10_000_000_000_000),
        );
        assert!(matches!(result, Err(AppError::Internal(_))));

        assert!(Challenge::new("user".into(), vec![], Duration::MAX).is_err());
    }

    #[test]
    fn new_users_get_distinct_ids() {
        let a = User::new("alice".into(), "Alice".into());
        let b = User::new("alice".into(), "Alice".into());
        assert_ne!(a.id, b.id);
    }
}
