//! # WebAuthn Module
//!
//! Relying party logic for passwordless authentication.
//!
//! ## Submodules
//! - `types`: Request types of the ceremony endpoints
//! - `registration`: Creating new passkey credentials
//! - `authentication`: Logging in with existing passkeys
//!
//! ## Ceremony Shape
//! Both ceremonies are an options call followed by a verify call:
//! 1. Client posts a username → server returns `{ publicKey }` and stores the
//!    ceremony state as a challenge
//! 2. Client runs the authenticator and posts its response → server verifies
//!    it against the stored state and deletes the challenge

pub mod authentication;
pub mod registration;
pub mod types;
