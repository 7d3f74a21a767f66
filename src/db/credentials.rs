//! # Credential Database Operations
//!
//! Storage for registered passkeys. Only public key material is stored;
//! private keys never leave the authenticator.

use crate::db::models::PasskeyCredential;
use crate::error::AppResult;
use chrono::Utc;
use sqlx::SqlitePool;

/// Save a newly registered passkey
///
/// ## Parameters
/// - `credential_id`: Unique identifier for this credential
/// - `user_id`: ID of the user who owns this credential
/// - `passkey`: Serialized `Passkey` (BLOB)
pub async fn save_credential(
    pool: &SqlitePool,
    credential_id: &str,
    user_id: &str,
    passkey: &[u8],
) -> AppResult<()> {
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO passkey_credentials (id, user_id, passkey, counter, created_at)
         VALUES (?, ?, ?, 0, ?)",
    )
    .bind(credential_id)
    .bind(user_id)
    .bind(passkey)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

/// All passkeys of a user, oldest first
///
/// An empty vector means the user has not registered anything yet.
pub async fn find_by_user_id(pool: &SqlitePool, user_id: &str) -> AppResult<Vec<PasskeyCredential>> {
    let credentials = sqlx::query_as::<_, PasskeyCredential>(
        "SELECT * FROM passkey_credentials WHERE user_id = ? ORDER BY created_at",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(credentials)
}

/// Persist the state of a passkey after a successful assertion
///
/// Rewrites the serialized passkey (webauthn-rs may have updated its
/// counter or backup state), stores the reported signature counter and
/// stamps `last_used_at`.
pub async fn record_use(
    pool: &SqlitePool,
    credential_id: &str,
    passkey: &[u8],
    counter: u32,
) -> AppResult<()> {
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "UPDATE passkey_credentials
         SET passkey = ?, counter = ?, last_used_at = ?
         WHERE id = ?",
    )
    .bind(passkey)
    .bind(i64::from(counter))
    .bind(now)
    .bind(credential_id)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users;
    use crate::state::test_support::test_state;

    #[tokio::test]
    async fn saved_credentials_are_listed_per_user() {
        let state = test_state().await;
        let alice = users::create_user(&state.db, "alice", "Alice").await.unwrap();
        let bob = users::create_user(&state.db, "bob", "Bob").await.unwrap();

        save_credential(&state.db, "cred-1", &alice.id, b"{}").await.unwrap();
        save_credential(&state.db, "cred-2", &alice.id, b"{}").await.unwrap();

        assert_eq!(find_by_user_id(&state.db, &alice.id).await.unwrap().len(), 2);
        assert!(find_by_user_id(&state.db, &bob.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn record_use_updates_counter_and_timestamp() {
        let state = test_state().await;
        let alice = users::create_user(&state.db, "alice", "Alice").await.unwrap();
        save_credential(&state.db, "cred-1", &alice.id, b"{}").await.unwrap();

        record_use(&state.db, "cred-1", b"{\"updated\":true}", 7).await.unwrap();

        let stored = find_by_user_id(&state.db, &alice.id).await.unwrap();
        assert_eq!(stored[0].counter, 7);
        assert_eq!(stored[0].passkey, b"{\"updated\":true}".to_vec());
        assert!(stored[0].last_used_at.is_some());
    }
}
