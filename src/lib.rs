//! Client-credentials token lifecycle management
//!
//! This library acquires bearer tokens from an OAuth2 authority using the
//! client credentials grant, caches them with a safety-margin expiration
//! policy, and serializes concurrent refreshes so that a burst of callers
//! produces at most one request to the authority.
//!
//! The expiration buffer is subtracted from each token's reported lifetime,
//! so a refresh happens before the authority would actually reject the
//! token. Failed requests are retried according to a pluggable
//! [`RetryPolicy`][retry::RetryPolicy]: network failures, rate limiting, and
//! server errors are retried; rejected credentials and malformed responses
//! fail immediately.
//!
//! # Usage
//!
//! Construct one [`TokenLifecycleManager`] at process start and share it by
//! reference. Splitting callers across independent managers loses the
//! single-flight refresh guarantee.
//!
//! ```no_run
//! use token_keeper::{
//!     ClientId, ClientSecret, HttpTokenTransport, OAuthConfig, TokenLifecycleManager,
//! };
//!
//! # async fn run() -> Result<(), token_keeper::TokenRequestError> {
//! let config = OAuthConfig::new(
//!     ClientId::from_static("my-client"),
//!     ClientSecret::from_static("my-secret"),
//!     "https://auth.example.com/oauth/token".to_owned(),
//! );
//!
//! let manager = TokenLifecycleManager::new(
//!     HttpTokenTransport::new(reqwest::Client::new()),
//!     config,
//! );
//!
//! let token = manager.get_valid_token().await?;
//! tracing::info!(
//!     expires_in = manager.expiration_info().expires_in_seconds,
//!     "token acquired"
//! );
//! # let _ = token;
//! # Ok(())
//! # }
//! ```
//!
//! Token values and client secrets are wrapped in types whose `Debug` and
//! `Display` implementations conceal the underlying value, so they cannot
//! leak through logging by accident.

#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

mod braids;
pub mod cache;
mod config;
mod dto;
pub mod error;
mod manager;
pub mod retry;
mod tokens;
pub mod transport;

pub use braids::*;
pub use cache::{ExpirationInfo, TokenCache};
pub use config::OAuthConfig;
pub use error::TokenRequestError;
pub use manager::TokenLifecycleManager;
pub use tokens::{Token, TokenLifetimeConfig};
pub use transport::{HttpTokenTransport, TokenTransport};
