use crate::db::challenges::{self, ChallengeKind};
use crate::db::{credentials, users};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::webauthn::registration::load_passkeys;
use webauthn_rs::prelude::*;

pub async fn start_authentication(state: &AppState, username: &str) -> AppResult<RequestChallengeResponse> {
    if username.trim().is_empty() {
        return Err(AppError::BadRequest("Username is required".to_string()));
    }

    let user = users::find_by_username(&state.db, username).await?;

    let passkeys = load_passkeys(state, &user.id).await?;
    if passkeys.is_empty() {
        return Err(AppError::NotFound(format!(
            "No passkeys found for user '{}'",
            username
        )));
    }

    // The allow list is every passkey the user owns
    let (rcr, auth_state) = state
        .webauthn
        .start_passkey_authentication(&passkeys)
        .map_err(AppError::WebAuthn)?;

    let state_bytes = serde_json::to_vec(&auth_state)?;
    challenges::save(
        &state.db,
        ChallengeKind::Authentication,
        &user.id,
        &state_bytes,
        state.challenge_ttl,
    )
    .await?;

    Ok(rcr)
}

/// Verify a signed assertion; returns the authenticated user's id
///
/// The pending challenge is consumed whether or not verification succeeds.
pub async fn finish_authentication(
    state: &AppState,
    username: &str,
    credential: &PublicKeyCredential,
) -> AppResult<String> {
    let user = users::find_by_username(&state.db, username).await?;

    // One-time use, even when verification fails
    let challenge = challenges::take(&state.db, ChallengeKind::Authentication, &user.id).await?;
    let auth_state: PasskeyAuthentication = serde_json::from_slice(&challenge.challenge_state)?;

    let auth_result = state
        .webauthn
        .finish_passkey_authentication(credential, &auth_state)
        .map_err(AppError::WebAuthn)?;

    // update_credential returns None for passkeys the assertion did not use
    let stored = credentials::find_by_user_id(&state.db, &user.id).await?;
    for row in stored {
        let mut passkey: Passkey = serde_json::from_slice(&row.passkey)?;
        if passkey.update_credential(&auth_result).is_some() {
            let passkey_bytes = serde_json::to_vec(&passkey)?;
            credentials::record_use(&state.db, &row.id, &passkey_bytes, auth_result.counter())
                .await?;
        }
    }

    tracing::info!("Authenticated {}", user.username);
    Ok(user.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::test_state;

    #[tokio::test]
    async fn unknown_user_cannot_start() {
        let state = test_state().await;

        assert!(matches!(
            start_authentication(&state, "nobody").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn user_without_passkeys_cannot_start() {
        let state = test_state().await;
        users::create_user(&state.db, "alice", "Alice").await.unwrap();

        let err = start_authentication(&state, "alice").await.unwrap_err();
        assert!(err.to_string().contains("No passkeys"));
    }
}
