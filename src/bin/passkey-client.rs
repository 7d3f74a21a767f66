//! # Passkey Terminal Client
//!
//! Interactive front end for the relying party: asks for a username and an
//! action, then runs the ceremony with an in-memory software passkey. Keys
//! are lost on exit, so register and authenticate in the same session.

use inquire::{InquireError, Select, Text};
use passkey_ceremony::client::{
    CeremonyController, HttpRelyingParty, SoftAuthenticator, TerminalAnnouncer,
};
use passkey_ceremony::config::ClientConfig;
use passkey_ceremony::telemetry;
use std::fmt;

#[derive(Debug, Clone, Copy)]
enum Action {
    Register,
    Authenticate,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Register => f.write_str("Register a passkey"),
            Action::Authenticate => f.write_str("Authenticate"),
            Action::Quit => f.write_str("Quit"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init("warn,passkey_ceremony=info");

    let config = ClientConfig::from_env()?;
    tracing::info!("Using relying party {} as origin {}", config.rp_url, config.origin);

    let controller = CeremonyController::mount(
        HttpRelyingParty::new(&config.rp_url)?,
        SoftAuthenticator::new(&config.origin, config.authenticator_timeout_ms)?,
        TerminalAnnouncer,
    )?;

    loop {
        let action = match Select::new(
            "What next?",
            vec![Action::Register, Action::Authenticate, Action::Quit],
        )
        .prompt()
        {
            Ok(Action::Quit) => break,
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let username = match Text::new("Username:").prompt() {
            Ok(username) => username,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => continue,
            Err(e) => return Err(e.into()),
        };

        // Outcomes are already announced; failures end only this attempt
        let result = match action {
            Action::Register => controller.register(&username).await,
            Action::Authenticate => controller.authenticate(&username).await,
            Action::Quit => break,
        };
        if let Err(e) = result {
            tracing::debug!("Attempt ended: {:?}", e);
        }
    }

    Ok(())
}
