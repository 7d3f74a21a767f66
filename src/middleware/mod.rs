//! # Middleware Module
//!
//! - `auth`: Rejects requests without an authenticated session

pub mod auth;
