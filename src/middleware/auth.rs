use crate::error::{AppError, AppResult};
use axum::{extract::Request, middleware::Next, response::Response};
use tower_sessions::Session;

/// Lets the request through only when the session carries a `user_id`,
/// which `authentication_verify` sets after a successful ceremony.
pub async fn require_auth(session: Session, request: Request, next: Next) -> AppResult<Response> {
    let authenticated = session
        .get::<String>("user_id")
        .await
        .map_err(|e| AppError::Internal(format!("Session error: {}", e)))?
        .is_some();

    if !authenticated {
        tracing::debug!("Rejecting unauthenticated request to {}", request.uri().path());
        return Err(AppError::Unauthorized("Not authenticated".to_string()));
    }

    Ok(next.run(request).await)
}
