//! # Configuration Management
//!
//! Configuration comes from the environment ("12-factor app"). A `.env` file is
//! loaded with `dotenvy` when present.
//!
//! ## Server variables
//! - `HOST`: Server bind address (default: 127.0.0.1)
//! - `PORT`: Server port (default: 7676)
//! - `DATABASE_URL`: SQLite database connection string
//! - `RP_ID`: WebAuthn Relying Party ID (usually your domain)
//! - `RP_ORIGIN`: WebAuthn Relying Party Origin (full URL)
//! - `RP_NAME`: Human-readable name for your service
//! - `STATIC_DIR`: Directory served for everything that is not an API route
//! - `CHALLENGE_TTL_SECS`: Lifetime of a pending ceremony challenge (1 to 86400)
//! - `CLEANUP_INTERVAL_SECS`: How often expired challenges are purged
//! - `SESSION_INACTIVITY_HOURS`: Session expiry after inactivity
//!
//! ## Client variables
//! - `RP_URL`: Base URL of the relying party server
//! - `CLIENT_ORIGIN`: Origin the authenticator binds credentials to
//! - `AUTHENTICATOR_TIMEOUT_MS`: Upper bound for one authenticator operation

use anyhow::{ensure, Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// A pending ceremony never outlives a day
const MAX_CHALLENGE_TTL_SECS: u64 = 24 * 60 * 60;

/// Relying party server configuration
///
/// ## WebAuthn Terminology
/// - **RP (Relying Party)**: The application that relies on passkey authentication
/// - **RP ID**: Your domain name (e.g., "example.com" or "localhost")
/// - **RP Origin**: Full URL of your application (e.g., "https://example.com")
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host/IP address to bind to
    pub host: String,

    /// Server port number
    pub port: u16,

    /// SQLite database connection URL
    /// Format: "sqlite:filename.db?mode=rwc"
    pub database_url: String,

    /// WebAuthn Relying Party ID, without protocol or port
    pub rp_id: String,

    /// WebAuthn Relying Party Origin, including protocol
    /// Must match the origin the browser (or client) reports
    pub rp_origin: String,

    /// Human-readable name shown to users during passkey creation
    pub rp_name: String,

    /// Directory holding the static front end
    pub static_dir: String,

    /// How long a registration/authentication challenge stays valid
    pub challenge_ttl: Duration,

    /// Interval of the expired-challenge cleanup task
    pub cleanup_interval: Duration,

    /// Hours of inactivity before a session expires
    pub session_inactivity_hours: i64,
}

impl Config {
    /// Load configuration from the process environment (and `.env`)
    ///
    /// ## Example .env file
    /// ```text
    /// HOST=127.0.0.1
    /// PORT=7676
    /// DATABASE_URL=sqlite:passkey.db?mode=rwc
    /// RP_ID=localhost
    /// RP_ORIGIN=http://localhost:7676
    /// RP_NAME=Passkey Demo
    /// ```
    pub fn from_env() -> Result<Self> {
        // dotenvy doesn't error if the file is missing
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Falls back to defaults for unset keys and fails only when a value is
    /// present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = parse_or(&lookup, "PORT", 7676)?;

        let challenge_ttl_secs: u64 = parse_or(&lookup, "CHALLENGE_TTL_SECS", 300)?;
        ensure!(
            (1..=MAX_CHALLENGE_TTL_SECS).contains(&challenge_ttl_secs),
            "CHALLENGE_TTL_SECS must be between 1 and {MAX_CHALLENGE_TTL_SECS}, got {challenge_ttl_secs}"
        );

        Ok(Config {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite:passkey.db?mode=rwc".to_string()),
            rp_id: lookup("RP_ID").unwrap_or_else(|| "localhost".to_string()),
            // Default origin follows the configured port
            rp_origin: lookup("RP_ORIGIN")
                .unwrap_or_else(|| format!("http://localhost:{port}")),
            rp_name: lookup("RP_NAME").unwrap_or_else(|| "Passkey Demo".to_string()),
            static_dir: lookup("STATIC_DIR").unwrap_or_else(|| "static".to_string()),
            challenge_ttl: Duration::from_secs(challenge_ttl_secs),
            cleanup_interval: Duration::from_secs(parse_or(
                &lookup,
                "CLEANUP_INTERVAL_SECS",
                600,
            )?),
            session_inactivity_hours: parse_or(&lookup, "SESSION_INACTIVITY_HOURS", 24)?,
        })
    }

    /// Socket address to bind the server to, e.g. "127.0.0.1:7676"
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Ceremony client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the relying party; endpoint paths are joined onto it
    pub rp_url: String,

    /// Origin reported to the relying party in client data
    /// Must equal the server's `RP_ORIGIN`
    pub origin: String,

    /// Timeout handed to the authenticator, in milliseconds
    pub authenticator_timeout_ms: u32,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rp_url = lookup("RP_URL").unwrap_or_else(|| "http://localhost:7676".to_string());

        Ok(ClientConfig {
            // Same-origin deployment unless told otherwise
            origin: lookup("CLIENT_ORIGIN").unwrap_or_else(|| rp_url.clone()),
            rp_url,
            authenticator_timeout_ms: parse_or(&lookup, "AUTHENTICATOR_TIMEOUT_MS", 60_000)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
