//! # Application State
//!
//! Resources shared by every request handler: the SQLite pool, the
//! configured `Webauthn` instance and the challenge lifetime.
//! Axum clones the state per request, which is cheap because every field is
//! a pool handle, an `Arc`, or `Copy`.

use crate::config::Config;
use anyhow::Result;
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use webauthn_rs::prelude::*;

#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Generates challenges and verifies authenticator responses.
    pub webauthn: Arc<Webauthn>,

    /// Lifetime of stored registration/authentication challenges
    pub challenge_ttl: Duration,
}

impl AppState {
    /// Connect to the configured database and build state on top of it
    ///
    /// # Errors
    /// Returns an error if the database connection or migrations fail, or
    /// the relying party settings are rejected by `webauthn-rs`.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = SqlitePool::connect(&config.database_url).await?;
        Self::from_pool(db, config).await
    }

    /// Build state on an existing pool, running migrations first
    pub async fn from_pool(db: SqlitePool, config: &Config) -> Result<Self> {
        // Embedded from ./migrations, tracked so they only run once
        sqlx::migrate!("./migrations").run(&db).await?;

        let webauthn = Arc::new(build_webauthn(config)?);

        Ok(AppState {
            db,
            webauthn,
            challenge_ttl: config.challenge_ttl,
        })
    }
}

/// Configure `Webauthn` with the relying party identity
///
/// The RP ID must be a registrable suffix of the origin's host.
pub fn build_webauthn(config: &Config) -> Result<Webauthn> {
    let rp_origin = Url::parse(&config.rp_origin)?;

    let webauthn = WebauthnBuilder::new(&config.rp_id, &rp_origin)?
        .rp_name(&config.rp_name)
        .build()?;

    Ok(webauthn)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_rp_id_outside_origin() {
        let mut config = test_support::test_config();
        config.rp_id = "example.com".to_string();

        assert!(build_webauthn(&config).is_err());
    }

    #[tokio::test]
    async fn migrations_create_tables() {
        let state = test_support::test_state().await;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
