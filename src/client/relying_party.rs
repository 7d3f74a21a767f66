//! HTTP side of a ceremony: fetching options and submitting the
//! authenticator's response.

use crate::client::ceremony::Ceremony;
use crate::client::error::CeremonyError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// The relying party endpoints a ceremony talks to
#[async_trait]
pub trait RelyingParty: Send + Sync {
    /// POST `{ username }` to the options endpoint and return the
    /// `publicKey` object of the response, untouched.
    async fn fetch_options(&self, ceremony: Ceremony, username: &str)
        -> Result<Value, CeremonyError>;

    /// POST `{ username, authenticatorResponse }` to the verify endpoint.
    /// Only the status is returned; the body is not inspected.
    async fn verify(
        &self,
        ceremony: Ceremony,
        username: &str,
        authenticator_response: &Value,
    ) -> Result<StatusCode, CeremonyError>;
}

#[derive(Serialize)]
struct OptionsRequest<'a> {
    username: &'a str,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    username: &'a str,
    #[serde(rename = "authenticatorResponse")]
    authenticator_response: &'a Value,
}

/// `reqwest`-backed relying party at a base URL
///
/// Endpoint paths are resolved relative to the base, so a base of
/// `https://example.com/passkeys` posts to
/// `https://example.com/passkeys/registration/options`.
///
/// The client built by [`HttpRelyingParty::new`] keeps cookies, so a session
/// started by a successful authentication is sent along with later
/// ceremonies (needed to add another passkey to the same account).
#[derive(Debug, Clone)]
pub struct HttpRelyingParty {
    http: reqwest::Client,
    registration: Endpoints,
    authentication: Endpoints,
}

#[derive(Debug, Clone)]
struct Endpoints {
    options: Url,
    verify: Url,
}

impl Endpoints {
    fn resolve(base: &Url, ceremony: Ceremony) -> Result<Self, url::ParseError> {
        Ok(Self {
            options: base.join(ceremony.options_path().trim_start_matches('/'))?,
            verify: base.join(ceremony.verify_path().trim_start_matches('/'))?,
        })
    }
}

impl HttpRelyingParty {
    pub fn new(base: &str) -> Result<Self, CeremonyError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Self::with_client(http, base)
    }

    pub fn with_client(http: reqwest::Client, base: &str) -> Result<Self, CeremonyError> {
        let mut base = Url::parse(base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http,
            registration: Endpoints::resolve(&base, Ceremony::Registration)?,
            authentication: Endpoints::resolve(&base, Ceremony::Authentication)?,
        })
    }

    fn endpoints(&self, ceremony: Ceremony) -> &Endpoints {
        match ceremony {
            Ceremony::Registration => &self.registration,
            Ceremony::Authentication => &self.authentication,
        }
    }
}

#[async_trait]
impl RelyingParty for HttpRelyingParty {
    async fn fetch_options(
        &self,
        ceremony: Ceremony,
        username: &str,
    ) -> Result<Value, CeremonyError> {
        let response = self
            .http
            .post(self.endpoints(ceremony).options.clone())
            .json(&OptionsRequest { username })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} options refused with {}", ceremony, status);
            return Err(CeremonyError::Status(status));
        }

        let body: Value = response.json().await?;
        extract_public_key(body)
    }

    async fn verify(
        &self,
        ceremony: Ceremony,
        username: &str,
        authenticator_response: &Value,
    ) -> Result<StatusCode, CeremonyError> {
        let response = self
            .http
            .post(self.endpoints(ceremony).verify.clone())
            .json(&VerifyRequest {
                username,
                authenticator_response,
            })
            .send()
            .await?;

        Ok(response.status())
    }
}

fn extract_public_key(body: Value) -> Result<Value, CeremonyError> {
    match body {
        Value::Object(mut fields) => match fields.remove("publicKey") {
            Some(options @ Value::Object(_)) => Ok(options),
            Some(_) => Err(CeremonyError::MalformedOptions(
                "publicKey is not an object".to_string(),
            )),
            None => Err(CeremonyError::MalformedOptions(
                "response has no publicKey".to_string(),
            )),
        },
        _ => Err(CeremonyError::MalformedOptions(
            "response is not a JSON object".to_string(),
        )),
    }
}
