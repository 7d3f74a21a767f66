//! # Router Assembly
//!
//! Wires handlers, middleware and shared state into the axum `Router` served
//! by `passkey-server`. Kept out of `main` so tests can drive the same
//! router in-process.

use crate::config::Config;
use crate::handlers::auth::*;
use crate::handlers::health::health_check;
use crate::handlers::users::get_current_user;
use crate::middleware::auth::require_auth;
use crate::state::AppState;
use anyhow::Result;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

/// Build the complete application router
///
/// Runs the session store migrations on the state's pool, so this is async
/// and fallible.
pub async fn build_router(state: AppState, config: &Config) -> Result<Router> {
    // Session data (user_id) lives server-side in SQLite; the cookie only
    // carries the session ID
    let session_store = SqliteStore::new(state.db.clone());
    session_store.migrate().await?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.rp_origin.starts_with("https://"))
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(
            config.session_inactivity_hours,
        )));

    // TODO: restrict to RP_ORIGIN once the front end is always served same-origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let protected_routes = Router::new()
        .route("/api/users/me", get(get_current_user))
        .route_layer(axum_middleware::from_fn(require_auth));

    let app = Router::new()
        .route("/health", get(health_check))
        // Registration ceremony
        .route("/registration/options", post(registration_options))
        .route("/registration/verify", post(registration_verify))
        // Authentication ceremony
        .route("/authentication/options", post(authentication_options))
        .route("/authentication/verify", post(authentication_verify))
        // Session management
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/session", get(session_info))
        .merge(protected_routes)
        // Front end (index.html, scripts, styles)
        .fallback_service(ServeDir::new(&config.static_dir))
        // Layers run bottom-up: trace → cors → session → handler
        .layer(session_layer)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Periodically delete expired challenges
///
/// Challenges are normally deleted when their ceremony finishes; this
/// catches abandoned ones.
pub fn spawn_challenge_cleanup(pool: SqlitePool, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            match crate::db::challenges::cleanup_expired(&pool).await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!("Removed {} expired challenge(s)", removed),
                Err(e) => tracing::error!("Challenge cleanup failed: {:?}", e),
            }
        }
    })
}
