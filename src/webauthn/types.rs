//! # Relying Party API Types
//!
//! Request bodies of the four ceremony endpoints. Responses of the options
//! endpoints are the `webauthn-rs` challenge types themselves, which
//! serialize as `{ "publicKey": { ... } }`.

use serde::{Deserialize, Serialize};
use webauthn_rs::prelude::{PublicKeyCredential, RegisterPublicKeyCredential};

/// Body of `/registration/options` and `/authentication/options`
///
/// ## Example JSON
/// ```json
/// { "username": "alice" }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct CeremonyOptionsRequest {
    pub username: String,

    /// Shown by the authenticator when creating a passkey.
    /// Defaults to the username; ignored for authentication.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Body of `/registration/verify`
///
/// The authenticator's attestation is parsed straight into the
/// `webauthn-rs` type, so malformed responses are rejected by the extractor.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegistrationVerifyRequest {
    pub username: String,

    #[serde(rename = "authenticatorResponse")]
    pub authenticator_response: RegisterPublicKeyCredential,
}

/// Body of `/authentication/verify`
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthenticationVerifyRequest {
    pub username: String,

    /// The signed assertion
    #[serde(rename = "authenticatorResponse")]
    pub authenticator_response: PublicKeyCredential,
}
