//! # Pending Ceremony Challenges
//!
//! Registration and authentication challenges live in separate tables with
//! the same shape. Each is one-time use and only valid until `expires_at`.

use crate::db::models::Challenge;
use crate::error::{AppError, AppResult};
use chrono::Utc;
use sqlx::SqlitePool;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeKind {
    /// Holds a serialized `PasskeyRegistration`
    Registration,
    /// Holds a serialized `PasskeyAuthentication`
    Authentication,
}

impl ChallengeKind {
    const ALL: [ChallengeKind; 2] = [ChallengeKind::Registration, ChallengeKind::Authentication];

    fn table(self) -> &'static str {
        match self {
            ChallengeKind::Registration => "registration_challenges",
            ChallengeKind::Authentication => "authentication_challenges",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ChallengeKind::Registration => "Registration",
            ChallengeKind::Authentication => "Authentication",
        }
    }
}

/// Store ceremony state for `user_id`, valid for `ttl`
pub async fn save(
    pool: &SqlitePool,
    kind: ChallengeKind,
    user_id: &str,
    challenge_state: &[u8],
    ttl: Duration,
) -> AppResult<String> {
    let challenge = Challenge::new(user_id.to_string(), challenge_state.to_vec(), ttl)?;

    sqlx::query(&format!(
        "INSERT INTO {} (id, user_id, challenge_state, created_at, expires_at)
         VALUES (?, ?, ?, ?, ?)",
        kind.table()
    ))
    .bind(&challenge.id)
    .bind(&challenge.user_id)
    .bind(&challenge.challenge_state)
    .bind(&challenge.created_at)
    .bind(&challenge.expires_at)
    .execute(pool)
    .await?;

    Ok(challenge.id)
}

/// Most recent challenge of the user
///
/// ## Errors
/// - NotFound: No pending challenge
/// - Unauthorized: The latest challenge has expired
pub async fn latest(pool: &SqlitePool, kind: ChallengeKind, user_id: &str) -> AppResult<Challenge> {
    let challenge = sqlx::query_as::<_, Challenge>(&format!(
        "SELECT * FROM {}
         WHERE user_id = ?
         ORDER BY created_at DESC
         LIMIT 1",
        kind.table()
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("{} challenge not found", kind.label())))?;

    let expires_at = chrono::DateTime::parse_from_rfc3339(&challenge.expires_at)
        .map_err(|_| AppError::Internal("Invalid expiration timestamp".to_string()))?;

    if Utc::now() > expires_at {
        return Err(AppError::Unauthorized("Challenge expired".to_string()));
    }

    Ok(challenge)
}

/// Claim the user's latest challenge
///
/// Every pending challenge of this kind is removed, including when the
/// latest one has expired, so each can be presented for verification once.
pub async fn take(pool: &SqlitePool, kind: ChallengeKind, user_id: &str) -> AppResult<Challenge> {
    let claimed = latest(pool, kind, user_id).await;
    delete(pool, kind, user_id).await?;
    claimed
}

/// Drop every pending challenge of this kind for the user
pub async fn delete(pool: &SqlitePool, kind: ChallengeKind, user_id: &str) -> AppResult<()> {
    sqlx::query(&format!("DELETE FROM {} WHERE user_id = ?", kind.table()))
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Remove expired challenges of both kinds, returning how many were dropped
pub async fn cleanup_expired(pool: &SqlitePool) -> AppResult<u64> {
    let now = Utc::now().to_rfc3339();
    let mut removed = 0;

    for kind in ChallengeKind::ALL {
        removed += sqlx::query(&format!("DELETE FROM {} WHERE expires_at < ?", kind.table()))
            .bind(&now)
            .execute(pool)
            .await?
            .rows_affected();
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users;
    use crate::state::test_support::test_state;

    const FIVE_MINUTES: Duration = Duration::from_secs(300);

    #[tokio::test]
    async fn save_latest_delete() {
        let state = test_state().await;
        let user = users::create_user(&state.db, "alice", "Alice").await.unwrap();

        save(&state.db, ChallengeKind::Registration, &user.id, b"state", FIVE_MINUTES)
            .await
            .unwrap();
        let challenge = latest(&state.db, ChallengeKind::Registration, &user.id).await.unwrap();
        assert_eq!(challenge.challenge_state, b"state".to_vec());

        delete(&state.db, ChallengeKind::Registration, &user.id).await.unwrap();
        assert!(matches!(
            latest(&state.db, ChallengeKind::Registration, &user.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn take_consumes_the_challenge() {
        let state = test_state().await;
        let user = users::create_user(&state.db, "alice", "Alice").await.unwrap();

        save(&state.db, ChallengeKind::Authentication, &user.id, b"state", FIVE_MINUTES)
            .await
            .unwrap();

        let claimed = take(&state.db, ChallengeKind::Authentication, &user.id).await.unwrap();
        assert_eq!(claimed.challenge_state, b"state".to_vec());
        assert!(matches!(
            take(&state.db, ChallengeKind::Authentication, &user.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn take_drops_an_expired_challenge() {
        let state = test_state().await;
        let user = users::create_user(&state.db, "alice", "Alice").await.unwrap();

        save(&state.db, ChallengeKind::Registration, &user.id, b"state", Duration::ZERO)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(matches!(
            take(&state.db, ChallengeKind::Registration, &user.id).await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            latest(&state.db, ChallengeKind::Registration, &user.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn kinds_do_not_mix() {
        let state = test_state().await;
        let user = users::create_user(&state.db, "alice", "Alice").await.unwrap();

        save(&state.db, ChallengeKind::Registration, &user.id, b"reg", FIVE_MINUTES)
            .await
            .unwrap();

        assert!(latest(&state.db, ChallengeKind::Authentication, &user.id).await.is_err());
    }

    #[tokio::test]
    async fn newest_challenge_wins() {
        let state = test_state().await;
        let user = users::create_user(&state.db, "alice", "Alice").await.unwrap();

        save(&state.db, ChallengeKind::Authentication, &user.id, b"first", FIVE_MINUTES)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        save(&state.db, ChallengeKind::Authentication, &user.id, b"second", FIVE_MINUTES)
            .await
            .unwrap();

        let challenge = latest(&state.db, ChallengeKind::Authentication, &user.id).await.unwrap();
        assert_eq!(challenge.challenge_state, b"second".to_vec());
    }

    #[tokio::test]
    async fn expired_challenge_is_unauthorized() {
        let state = test_state().await;
        let user = users::create_user(&state.db, "alice", "Alice").await.unwrap();

        save(&state.db, ChallengeKind::Authentication, &user.id, b"state", Duration::ZERO)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(matches!(
            latest(&state.db, ChallengeKind::Authentication, &user.id).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn cleanup_only_drops_expired() {
        let state = test_state().await;
        let user = users::create_user(&state.db, "alice", "Alice").await.unwrap();

        save(&state.db, ChallengeKind::Registration, &user.id, b"old", Duration::ZERO)
            .await
            .unwrap();
        save(&state.db, ChallengeKind::Authentication, &user.id, b"fresh", FIVE_MINUTES)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert_eq!(cleanup_expired(&state.db).await.unwrap(), 1);
        assert!(latest(&state.db, ChallengeKind::Authentication, &user.id).await.is_ok());
    }
}
