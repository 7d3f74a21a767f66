use crate::db::{credentials, users};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use tower_sessions::Session;

/// GET /api/users/me
///
/// Profile of the session user. Protected by `require_auth`, but the
/// session is read again since the middleware passes nothing along.
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "username": "alice",
///   "display_name": "alice",
///   "passkeys": 1,
///   "created_at": "2024-01-15T10:30:00+00:00"
/// }
/// ```
pub async fn get_current_user(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Value>> {
    let user_id: String = session
        .get("user_id")
        .await
        .map_err(|e| AppError::Internal(format!("Session error: {}", e)))?
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    let user = users::find_by_id(&state.db, &user_id).await?;
    let passkeys = credentials::find_by_user_id(&state.db, &user.id).await?;

    // Credential material stays server-side
    Ok(Json(json!({
        "id": user.id,
        "username": user.username,
        "display_name": user.display_name,
        "passkeys": passkeys.len(),
        "created_at": user.created_at
    })))
}
