//! In-memory caching of the most recently issued token

use std::sync::Mutex;

use aliri_clock::{Clock, System};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Token;

/// A thread-safe store holding at most one token
///
/// Expired entries are evicted lazily: [`get`][TokenCache::get] simply stops
/// returning them. With a single entry there is nothing for a background
/// sweep to do.
#[derive(Debug)]
pub struct TokenCache<C = System> {
    entry: Mutex<Option<Token>>,
    clock: C,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCache {
    /// Constructs an empty cache using the system clock
    pub fn new() -> Self {
        Self {
            entry: Mutex::new(None),
            clock: System,
        }
    }
}

impl<C> TokenCache<C> {
    /// Sets a custom clock to be used
    ///
    /// Useful for testing purposes
    pub fn with_clock<D>(self, clock: D) -> TokenCache<D> {
        TokenCache {
            entry: self.entry,
            clock,
        }
    }

    /// Replaces the cached entry unconditionally
    pub fn set(&self, token: Token) {
        let mut entry = self.entry.lock().unwrap_or_else(|e| e.into_inner());
        *entry = Some(token);
    }

    /// Removes any cached entry; idempotent
    pub fn clear(&self) {
        let mut entry = self.entry.lock().unwrap_or_else(|e| e.into_inner());
        if entry.take().is_some() {
            tracing::debug!("token cleared from cache");
        }
    }
}

impl<C: Clock> TokenCache<C> {
    /// Returns the cached token, provided it has not reached its effective
    /// expiry
    ///
    /// An expired entry behaves exactly as an absent one.
    pub fn get(&self) -> Option<Token> {
        let now = self.clock.now();
        let entry = self.entry.lock().unwrap_or_else(|e| e.into_inner());
        entry.as_ref().filter(|t| t.is_valid_at(now)).cloned()
    }

    /// Produces the read-only status projection of the cache
    ///
    /// The projection never contains the token value.
    pub fn expiration_info(&self) -> ExpirationInfo {
        let now = self.clock.now();
        let entry = self.entry.lock().unwrap_or_else(|e| e.into_inner());

        match entry.as_ref() {
            Some(token) => ExpirationInfo {
                has_token: true,
                expires_at: DateTime::from_timestamp(token.expiry().0 as i64, 0),
                expires_in_seconds: token.until_expiry_at(now).0,
                is_valid: token.is_valid_at(now),
            },
            None => ExpirationInfo {
                has_token: false,
                expires_at: None,
                expires_in_seconds: 0,
                is_valid: false,
            },
        }
    }
}

/// A read-only view of the cache's expiration state
///
/// Suitable for exposing on a status endpoint; it carries no secret
/// material.
#[derive(Clone, Debug, Serialize)]
pub struct ExpirationInfo {
    /// Whether any token is cached, valid or not
    pub has_token: bool,
    /// The effective expiry of the cached token
    pub expires_at: Option<DateTime<Utc>>,
    /// Seconds until the effective expiry, zero once expired
    pub expires_in_seconds: u64,
    /// Whether the cached token is still usable
    pub is_valid: bool,
}
