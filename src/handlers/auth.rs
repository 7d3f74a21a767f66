use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::webauthn::types::*;
use crate::webauthn::{authentication, registration};
use axum::{extract::State, Json};
use serde_json::{json, Value};
use tower_sessions::Session;

// Registration endpoints

pub async fn registration_options(
    session: Session,
    State(state): State<AppState>,
    Json(req): Json<CeremonyOptionsRequest>,
) -> AppResult<Json<Value>> {
    tracing::debug!("Getting registration options for {}", req.username);
    let session_user = session_user_id(&session).await?;
    let ccr = registration::start_registration(
        &state,
        &req.username,
        req.display_name.as_deref(),
        session_user.as_deref(),
    )
    .await?;

    Ok(Json(json!(ccr)))
}

pub async fn registration_verify(
    State(state): State<AppState>,
    Json(req): Json<RegistrationVerifyRequest>,
) -> AppResult<Json<Value>> {
    tracing::debug!("Verifying registration response for {}", req.username);
    registration::finish_registration(&state, &req.username, &req.authenticator_response).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Registration successful"
    })))
}

// Authentication endpoints

pub async fn authentication_options(
    State(state): State<AppState>,
    Json(req): Json<CeremonyOptionsRequest>,
) -> AppResult<Json<Value>> {
    tracing::debug!("Getting authentication options for {}", req.username);
    let rcr = authentication::start_authentication(&state, &req.username).await?;

    Ok(Json(json!(rcr)))
}

pub async fn authentication_verify(
    session: Session,
    State(state): State<AppState>,
    Json(req): Json<AuthenticationVerifyRequest>,
) -> AppResult<Json<Value>> {
    tracing::debug!("Verifying authentication response for {}", req.username);
    let user_id =
        authentication::finish_authentication(&state, &req.username, &req.authenticator_response)
            .await?;

    session
        .insert("user_id", &user_id)
        .await
        .map_err(|e| AppError::Internal(format!("Session error: {}", e)))?;

    Ok(Json(json!({
        "success": true,
        "user_id": user_id,
        "message": "Authentication successful"
    })))
}

// Session endpoints

pub async fn logout(session: Session) -> AppResult<Json<Value>> {
    session
        .delete()
        .await
        .map_err(|e| AppError::Internal(format!("Session error: {}", e)))?;

    Ok(Json(json!({
        "success": true,
        "message": "Logged out successfully"
    })))
}

pub async fn session_info(session: Session) -> AppResult<Json<Value>> {
    match session_user_id(&session).await? {
        Some(id) => Ok(Json(json!({
            "authenticated": true,
            "user_id": id
        }))),
        None => Ok(Json(json!({
            "authenticated": false
        }))),
    }
}

async fn session_user_id(session: &Session) -> AppResult<Option<String>> {
    session
        .get("user_id")
        .await
        .map_err(|e| AppError::Internal(format!("Session error: {}", e)))
}
