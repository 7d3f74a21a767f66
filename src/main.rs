//! # Passkey Relying Party Server
//!
//! Serves the registration and authentication ceremony endpoints used by
//! `passkey-client` (or a browser front end placed in `STATIC_DIR`).
//!
//! ## Key Concepts
//! - **WebAuthn**: Web Authentication API for passwordless authentication
//! - **Passkeys**: User-friendly WebAuthn credentials
//! - **Relying Party**: This server; it issues challenges and verifies
//!   authenticator responses

use passkey_ceremony::app::{build_router, spawn_challenge_cleanup};
use passkey_ceremony::config::Config;
use passkey_ceremony::state::AppState;
use passkey_ceremony::telemetry;

/// 1. Set up logging
/// 2. Load configuration from the environment
/// 3. Open the database and configure WebAuthn
/// 4. Start the expired-challenge cleanup task
/// 5. Serve the router
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init("info,passkey_ceremony=debug,tower_http=debug");

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded: {:?}", config);

    let app_state = AppState::new(&config).await?;
    tracing::info!("Application state initialized");

    spawn_challenge_cleanup(app_state.db.clone(), config.cleanup_interval);

    let app = build_router(app_state, &config).await?;

    let bind_addr = config.bind_address();
    tracing::info!("Relying party {} listening on {}", config.rp_origin, bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
