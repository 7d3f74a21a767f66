//! The authenticator side of a ceremony.
//!
//! Options arrive as the opaque `publicKey` object from the relying party
//! and the credential goes back out as opaque JSON, so the controller never
//! looks inside either.

use crate::client::error::AuthenticatorError;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Capability check, consulted once when the controller is mounted
    fn is_supported(&self) -> bool;

    /// Create a new credential from `PublicKeyCredentialCreationOptions`
    async fn create_credential(&self, options: Value) -> Result<Value, AuthenticatorError>;

    /// Sign a challenge from `PublicKeyCredentialRequestOptions`
    async fn get_assertion(&self, options: Value) -> Result<Value, AuthenticatorError>;
}

#[cfg(feature = "softpasskey")]
pub use soft::SoftAuthenticator;

#[cfg(feature = "softpasskey")]
mod soft {
    use super::*;
    use std::sync::{Arc, Mutex};
    use url::Url;
    use webauthn_authenticator_rs::softpasskey::SoftPasskey;
    use webauthn_authenticator_rs::AuthenticatorBackend;
    use webauthn_rs_proto::{PublicKeyCredentialCreationOptions, PublicKeyCredentialRequestOptions};

    /// In-memory software passkey
    ///
    /// Keys live only as long as this value. User verification is reported
    /// as performed, since there is no user to verify. Key generation and
    /// signing run on tokio's blocking pool.
    pub struct SoftAuthenticator {
        origin: Url,
        timeout_ms: u32,
        backend: Arc<Mutex<SoftPasskey>>,
    }

    impl SoftAuthenticator {
        /// `origin` must match the relying party's configured origin
        pub fn new(origin: &str, timeout_ms: u32) -> Result<Self, url::ParseError> {
            Ok(Self {
                origin: Url::parse(origin)?,
                timeout_ms,
                backend: Arc::new(Mutex::new(SoftPasskey::new(true))),
            })
        }

        /// Run `op` against the passkey off the async workers
        async fn with_backend<T, F>(&self, op: F) -> Result<T, AuthenticatorError>
        where
            T: Send + 'static,
            F: FnOnce(&mut SoftPasskey, Url, u32) -> Result<T, AuthenticatorError> + Send + 'static,
        {
            let backend = Arc::clone(&self.backend);
            let origin = self.origin.clone();
            let timeout_ms = self.timeout_ms;

            tokio::task::spawn_blocking(move || {
                let mut passkey = backend.lock().map_err(|_| {
                    AuthenticatorError::Rejected("authenticator state poisoned".to_string())
                })?;
                op(&mut passkey, origin, timeout_ms)
            })
            .await
            .map_err(|e| AuthenticatorError::Rejected(format!("authenticator task failed: {e}")))?
        }
    }

    #[async_trait]
    impl Authenticator for SoftAuthenticator {
        fn is_supported(&self) -> bool {
            true
        }

        async fn create_credential(&self, options: Value) -> Result<Value, AuthenticatorError> {
            let options: PublicKeyCredentialCreationOptions = serde_json::from_value(options)?;

            let credential = self
                .with_backend(move |passkey, origin, timeout_ms| {
                    passkey
                        .perform_register(origin, options, timeout_ms)
                        .map_err(|e| AuthenticatorError::Rejected(format!("{e:?}")))
                })
                .await?;

            Ok(serde_json::to_value(&credential)?)
        }

        async fn get_assertion(&self, options: Value) -> Result<Value, AuthenticatorError> {
            let options: PublicKeyCredentialRequestOptions = serde_json::from_value(options)?;

            let assertion = self
                .with_backend(move |passkey, origin, timeout_ms| {
                    passkey
                        .perform_auth(origin, options, timeout_ms)
                        .map_err(|e| AuthenticatorError::Rejected(format!("{e:?}")))
                })
                .await?;

            Ok(serde_json::to_value(&assertion)?)
        }
    }

}
