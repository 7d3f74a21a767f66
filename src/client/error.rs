use reqwest::StatusCode;
use thiserror::Error;

/// Why a ceremony attempt ended without a verdict
///
/// Every variant is terminal for the current attempt; nothing is retried.
#[derive(Error, Debug)]
pub enum CeremonyError {
    /// The platform has no usable authenticator
    #[error("Passkeys are not supported on this platform")]
    Unsupported,

    /// Nothing was sent; the user has to enter a username first
    #[error("Please enter a username")]
    MissingUsername,

    /// The relying party base URL cannot carry the endpoint paths
    #[error("invalid relying party endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// Network failure talking to the relying party
    #[error("request to relying party failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The relying party refused to hand out ceremony options
    #[error("relying party responded with {0}")]
    Status(StatusCode),

    /// The options response carried no usable `publicKey` object
    #[error("malformed ceremony options: {0}")]
    MalformedOptions(String),

    /// Cancelled, timed out, or otherwise refused by the authenticator
    #[error(transparent)]
    Authenticator(#[from] AuthenticatorError),
}

#[derive(Error, Debug)]
pub enum AuthenticatorError {
    /// The options could not be read, or the result could not be encoded
    #[error("authenticator could not process the ceremony data: {0}")]
    InvalidData(#[from] serde_json::Error),

    #[error("authenticator rejected the ceremony: {0}")]
    Rejected(String),
}
