//! # Ceremony Client
//!
//! Drives passkey ceremonies against a relying party. The controller is UI
//! agnostic; the three seams it depends on are traits:
//!
//! - [`RelyingParty`]: the options/verify endpoints ([`HttpRelyingParty`])
//! - [`Authenticator`]: the platform authenticator (`SoftAuthenticator`
//!   with the `softpasskey` feature)
//! - [`Announcer`]: transient status messages ([`StatusLine`],
//!   [`TerminalAnnouncer`])
//!
//! ```no_run
//! # async fn demo() -> anyhow::Result<()> {
//! use passkey_ceremony::client::*;
//!
//! let controller = CeremonyController::mount(
//!     HttpRelyingParty::new("http://localhost:7676")?,
//!     SoftAuthenticator::new("http://localhost:7676", 60_000)?,
//!     StatusLine::new(),
//! )?;
//!
//! controller.register("alice").await?;
//! controller.authenticate("alice").await?;
//! # Ok(())
//! # }
//! ```

pub mod announcer;
pub mod authenticator;
pub mod ceremony;
pub mod error;
pub mod relying_party;

pub use announcer::{Announcer, StatusLine, TerminalAnnouncer};
#[cfg(feature = "softpasskey")]
pub use authenticator::SoftAuthenticator;
pub use authenticator::Authenticator;
pub use ceremony::{Ceremony, CeremonyController, Verdict};
pub use error::{AuthenticatorError, CeremonyError};
pub use relying_party::{HttpRelyingParty, RelyingParty};
