//! # Ceremony Controller
//!
//! Drives one registration or authentication attempt. Each attempt has the
//! same three steps:
//! 1. Get ceremony options from the relying party
//! 2. Hand the options to the authenticator
//! 3. Submit the authenticator's response to the relying party for
//!    verification
//!
//! The options and the authenticator's response are passed through as
//! opaque JSON. Only the HTTP status of step 3 decides the verdict.
//! Attempts are never retried and concurrent attempts are not coordinated.

use crate::client::announcer::{Announcer, DEFAULT_KEEP, PROMPT_KEEP};
use crate::client::authenticator::Authenticator;
use crate::client::error::CeremonyError;
use crate::client::relying_party::RelyingParty;
use reqwest::StatusCode;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ceremony {
    Registration,
    Authentication,
}

impl Ceremony {
    pub fn options_path(self) -> &'static str {
        match self {
            Ceremony::Registration => "/registration/options",
            Ceremony::Authentication => "/authentication/options",
        }
    }

    pub fn verify_path(self) -> &'static str {
        match self {
            Ceremony::Registration => "/registration/verify",
            Ceremony::Authentication => "/authentication/verify",
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            Ceremony::Registration => "Success! Now try to authenticate...",
            Ceremony::Authentication => "Success! You're authenticated",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Ceremony::Registration => "Registration failed",
            Ceremony::Authentication => "Authentication failed",
        }
    }
}

impl fmt::Display for Ceremony {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ceremony::Registration => f.write_str("registration"),
            Ceremony::Authentication => f.write_str("authentication"),
        }
    }
}

/// The relying party's reading of a completed ceremony
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Verify endpoint answered 2xx
    Verified,
    /// Verify endpoint answered with this non-2xx status
    Rejected(StatusCode),
}

impl Verdict {
    pub fn is_verified(self) -> bool {
        matches!(self, Verdict::Verified)
    }
}

pub struct CeremonyController<R, A, N> {
    relying_party: R,
    authenticator: A,
    announcer: N,
}

impl<R, A, N> CeremonyController<R, A, N>
where
    R: RelyingParty,
    A: Authenticator,
    N: Announcer,
{
    /// Check platform support and build the controller
    ///
    /// When the authenticator reports no support the incompatibility notice
    /// is shown and no controller is built, so no ceremony can be started.
    pub fn mount(relying_party: R, authenticator: A, announcer: N) -> Result<Self, CeremonyError> {
        if !authenticator.is_supported() {
            tracing::warn!("Authenticator unavailable, ceremonies disabled");
            announcer.show_incompatible();
            return Err(CeremonyError::Unsupported);
        }

        Ok(Self {
            relying_party,
            authenticator,
            announcer,
        })
    }

    pub async fn register(&self, username: &str) -> Result<Verdict, CeremonyError> {
        self.run(Ceremony::Registration, username).await
    }

    pub async fn authenticate(&self, username: &str) -> Result<Verdict, CeremonyError> {
        self.run(Ceremony::Authentication, username).await
    }

    /// One attempt at `ceremony`
    ///
    /// Outcomes are announced before returning. Errors are announced as
    /// `Error: <message>` and then handed back to the caller.
    pub async fn run(&self, ceremony: Ceremony, username: &str) -> Result<Verdict, CeremonyError> {
        if username.is_empty() {
            let err = CeremonyError::MissingUsername;
            self.announcer.announce(&err.to_string(), PROMPT_KEEP);
            return Err(err);
        }

        match self.attempt(ceremony, username).await {
            Ok(verdict) => {
                let message = if verdict.is_verified() {
                    ceremony.success_message()
                } else {
                    ceremony.failure_message()
                };
                self.announcer.announce(message, DEFAULT_KEEP);
                Ok(verdict)
            }
            Err(err) => {
                tracing::warn!("{} for {} failed: {}", ceremony, username, err);
                self.announcer.announce(&format!("Error: {err}"), DEFAULT_KEEP);
                Err(err)
            }
        }
    }

    async fn attempt(&self, ceremony: Ceremony, username: &str) -> Result<Verdict, CeremonyError> {
        let options = self.relying_party.fetch_options(ceremony, username).await?;
        tracing::debug!("{} options from RP: {}", ceremony, options);

        let response = match ceremony {
            Ceremony::Registration => self.authenticator.create_credential(options).await?,
            Ceremony::Authentication => self.authenticator.get_assertion(options).await?,
        };
        tracing::debug!("{} response from authenticator: {}", ceremony, response);

        let status = self
            .relying_party
            .verify(ceremony, username, &response)
            .await?;
        tracing::debug!("{} verification status from RP: {}", ceremony, status);

        Ok(if status.is_success() {
            Verdict::Verified
        } else {
            Verdict::Rejected(status)
        })
    }

    pub fn announcer(&self) -> &N {
        &self.announcer
    }
}
