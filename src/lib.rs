//! # Passkey Ceremony
//!
//! WebAuthn (passkey) registration and authentication, both sides of the
//! wire:
//!
//! - [`client`]: drives a ceremony from a username: fetch options from the
//!   relying party, run the authenticator, submit the response for
//!   verification, announce the outcome
//! - the relying party server ([`app`], [`handlers`], [`webauthn`], [`db`]):
//!   issues challenges and verifies responses with `webauthn-rs`
//!
//! ## Endpoints
//! | Endpoint | Body |
//! |---|---|
//! | `POST /registration/options` | `{ username }` |
//! | `POST /registration/verify` | `{ username, authenticatorResponse }` |
//! | `POST /authentication/options` | `{ username }` |
//! | `POST /authentication/verify` | `{ username, authenticatorResponse }` |

pub mod app;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod telemetry;
pub mod webauthn;
