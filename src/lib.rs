//! # E-Sign Token Agent Library
//!
//! Provides JWT-bearer access-token acquisition for an e-signature REST API:
//! normalizing service-account key material, signing assertions, exchanging
//! them for bearer tokens, caching the result for its validity window, and
//! classifying consent-required failures into a typed error.
//!
//! Modules:
//! - `config` — service credentials and agent settings
//! - `auth` — key normalization, assertion signing, token exchange, consent URLs
//! - `cache` — cached token value type
//! - `server` — consent-callback HTTP surface

pub mod auth;
pub mod cache;
pub mod config;
pub mod helpers;
pub mod server;
pub mod utils;

#[cfg(test)]
pub mod tests;

pub use crate::auth::error::AuthError;
pub use crate::auth::provider::TokenProvider;
pub use crate::config::credentials::ServiceCredentials;
pub use crate::config::settings::Settings;
