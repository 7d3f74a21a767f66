//! # HTTP Request Handlers
//!
//! - `health`: Health check endpoint
//! - `auth`: Ceremony endpoints (registration & authentication options/verify)
//!   plus session info and logout
//! - `users`: Profile of the logged-in user
//!
//! Handlers extract the request, call into `crate::webauthn` or `crate::db`
//! and return `AppResult<Json<Value>>`.

pub mod auth;
pub mod health;
pub mod users;
