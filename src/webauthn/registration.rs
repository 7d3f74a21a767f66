//! # Passkey Registration Logic
//!
//! Server side of the registration ceremony, split into options and verify.
//!
//! ## Registration Flow
//! 1. **Options**: Resolve (or create) the user, generate a challenge,
//!    store the ceremony state, return the creation options
//! 2. **Verify**: Load the stored state, let `webauthn-rs` verify the
//!    attestation, store the resulting passkey
//!
//! A user may register several passkeys. Once an account owns a passkey,
//! only a session signed in as that account may add another. Every
//! credential they already own is listed in `excludeCredentials` so the
//! same authenticator is not enrolled twice.

use crate::db::challenges::{self, ChallengeKind};
use crate::db::{credentials, users};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use webauthn_rs::prelude::*;

/// Produce registration options for `username`
///
/// Existing users keep their UUID (the WebAuthn user handle); unknown
/// usernames get a new account. `session_user` is the `user_id` of the
/// caller's session, if any.
///
/// ## Errors
/// - BadRequest: Empty username
/// - Unauthorized: The user already owns passkeys and the caller is not
///   signed in as them
/// - Database: User creation or challenge storage failed
/// - WebAuthn: Challenge generation failed
pub async fn start_registration(
    state: &AppState,
    username: &str,
    display_name: Option<&str>,
    session_user: Option<&str>,
) -> AppResult<CreationChallengeResponse> {
    if username.trim().is_empty() {
        return Err(AppError::BadRequest("Username is required".to_string()));
    }

    let (user, exclude_credentials) = match users::lookup_by_username(&state.db, username).await? {
        Some(user) => {
            let owned = credentials::find_by_user_id(&state.db, &user.id).await?;
            if !owned.is_empty() && session_user != Some(user.id.as_str()) {
                tracing::warn!("Refused passkey enrollment for {} without its session", user.username);
                return Err(AppError::Unauthorized(format!(
                    "Sign in as '{}' to add a passkey",
                    user.username
                )));
            }
            tracing::debug!(
                "Existing user {} ({}) has {} passkey(s)",
                user.username,
                user.id,
                owned.len()
            );
            let excluded = owned
                .iter()
                .map(|cred| {
                    serde_json::from_slice::<Passkey>(&cred.passkey).map(|pk| pk.cred_id().clone())
                })
                .collect::<Result<Vec<CredentialID>, _>>()?;
            (user, (!excluded.is_empty()).then_some(excluded))
        }
        None => {
            let display_name = display_name.unwrap_or(username);
            let user = users::create_user(&state.db, username, display_name).await?;
            tracing::info!("Created user {} ({})", user.username, user.id);
            (user, None)
        }
    };

    let user_uuid = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::Internal("Invalid user UUID".to_string()))?;

    // ccr goes to the client, reg_state stays on the server
    let (ccr, reg_state) = state
        .webauthn
        .start_passkey_registration(user_uuid, &user.username, &user.display_name, exclude_credentials)
        .map_err(AppError::WebAuthn)?;

    let state_bytes = serde_json::to_vec(&reg_state)?;
    challenges::save(
        &state.db,
        ChallengeKind::Registration,
        &user.id,
        &state_bytes,
        state.challenge_ttl,
    )
    .await?;

    Ok(ccr)
}

/// Verify the authenticator's attestation and store the new passkey
///
/// ## What gets verified?
/// - The challenge matches the stored one and hasn't expired
/// - RP ID and origin match this server
/// - The attestation is well formed and the credential is not excluded
///
/// The pending challenge is consumed whether or not verification succeeds.
///
/// ## Errors
/// - NotFound: Unknown user or no pending challenge
/// - Unauthorized: Challenge expired
/// - WebAuthn: Verification failed
pub async fn finish_registration(
    state: &AppState,
    username: &str,
    credential: &RegisterPublicKeyCredential,
) -> AppResult<()> {
    let user = users::find_by_username(&state.db, username).await?;

    // One-time use, even when verification fails
    let challenge = challenges::take(&state.db, ChallengeKind::Registration, &user.id).await?;
    let reg_state: PasskeyRegistration = serde_json::from_slice(&challenge.challenge_state)?;

    let passkey = state
        .webauthn
        .finish_passkey_registration(credential, &reg_state)
        .map_err(AppError::WebAuthn)?;

    let passkey_bytes = serde_json::to_vec(&passkey)?;
    let cred_id = format!("{:?}", passkey.cred_id());

    credentials::save_credential(&state.db, &cred_id, &user.id, &passkey_bytes).await?;

    tracing::info!("Registered passkey for {}", user.username);
    Ok(())
}

/// Deserialize every stored passkey of a user
pub(crate) async fn load_passkeys(state: &AppState, user_id: &str) -> AppResult<Vec<Passkey>> {
    let stored = credentials::find_by_user_id(&state.db, user_id).await?;

    let passkeys = stored
        .iter()
        .map(|cred| serde_json::from_slice::<Passkey>(&cred.passkey))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(passkeys)
}
