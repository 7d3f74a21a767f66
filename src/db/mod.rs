//! # Database Module
//!
//! - `models`: Row types (user, passkey credential, pending challenges)
//! - `users`: User lookup and creation
//! - `credentials`: Registered passkeys
//! - `challenges`: Pending registration & authentication ceremonies

pub mod challenges;
pub mod credentials;
pub mod models;
pub mod users;
