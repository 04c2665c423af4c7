//! Orchestration of token acquisition, caching, and refresh

use std::error;
use std::time::Duration;

use aliri_clock::{Clock, System};

use crate::cache::{ExpirationInfo, TokenCache};
use crate::config::OAuthConfig;
use crate::dto::{TokenErrorResponse, TokenResponse};
use crate::error::{InvalidResponseReason, TokenRequestError};
use crate::retry::{ImmediateRetry, RetryPolicy};
use crate::tokens::{Token, TokenLifetimeConfig};
use crate::transport::TokenTransport;
use crate::AccessToken;

/// Manages the lifecycle of a single client-credentials token
///
/// One manager owns one cached token, one refresh lock, and one retry
/// policy. It is intended to be constructed once at process start and shared
/// by reference; independent instances each refresh on their own and lose
/// the single-flight guarantee between them.
///
/// Concurrent callers of [`get_valid_token`][Self::get_valid_token] that
/// observe an empty or expired cache serialize on the refresh lock, so a
/// burst of callers produces at most one request to the authority. Callers
/// that find a valid token never touch the lock.
#[derive(Debug)]
pub struct TokenLifecycleManager<T, C = System> {
    transport: T,
    config: OAuthConfig,
    lifetime_config: TokenLifetimeConfig<C>,
    cache: TokenCache<C>,
    retry: Box<dyn RetryPolicy>,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl<T> TokenLifecycleManager<T, System> {
    /// Constructs a manager with an empty cache and the default
    /// zero-delay retry policy sized from the configuration
    pub fn new(transport: T, config: OAuthConfig) -> Self {
        let lifetime_config = TokenLifetimeConfig::new(config.expiration_buffer);
        let retry = Box::new(ImmediateRetry::new(config.max_retry_attempts));
        Self {
            transport,
            config,
            lifetime_config,
            cache: TokenCache::new(),
            retry,
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }
}

impl<T, C> TokenLifecycleManager<T, C> {
    /// Swaps in a different retry strategy
    pub fn with_retry_policy(mut self, policy: impl RetryPolicy + 'static) -> Self {
        self.retry = Box::new(policy);
        self
    }

    /// Sets a custom clock to be used
    ///
    /// Useful for testing purposes
    pub fn with_clock<D: Clock + Clone>(self, clock: D) -> TokenLifecycleManager<T, D> {
        TokenLifecycleManager {
            transport: self.transport,
            config: self.config,
            lifetime_config: self.lifetime_config.with_clock(clock.clone()),
            cache: self.cache.with_clock(clock),
            retry: self.retry,
            refresh_lock: self.refresh_lock,
        }
    }

    /// Discards the cached token, forcing the next caller to refresh
    ///
    /// Useful after a downstream service rejects the token ahead of its
    /// expected expiry.
    pub fn clear(&self) {
        self.cache.clear();
    }
}

impl<T, C: Clock> TokenLifecycleManager<T, C> {
    /// Produces the read-only status projection of the token cache
    pub fn expiration_info(&self) -> ExpirationInfo {
        self.cache.expiration_info()
    }
}

impl<T: TokenTransport, C: Clock> TokenLifecycleManager<T, C> {
    /// Returns a valid access token, refreshing it if necessary
    ///
    /// The cache is consulted before the refresh lock is taken, so callers
    /// holding a valid token proceed without serializing. A caller that
    /// acquires the lock re-checks the cache first; whoever arrives second
    /// finds the token its predecessor stored and makes no network call.
    ///
    /// Always yields a token or an error, never an empty result. Dropping
    /// the future at any await point abandons the refresh without caching a
    /// partial result.
    pub async fn get_valid_token(&self) -> Result<AccessToken, TokenRequestError> {
        if let Some(token) = self.cache.get() {
            tracing::debug!("valid token retrieved from cache");
            return Ok(token.into_access_token());
        }

        tracing::debug!("token missing or expired, acquiring refresh lock");
        let _guard = self.refresh_lock.lock().await;

        if let Some(token) = self.cache.get() {
            tracing::debug!("token was refreshed by another caller");
            return Ok(token.into_access_token());
        }

        let token = self.request_token().await?;
        let access_token = token.access_token().to_owned();
        self.cache.set(token);
        Ok(access_token)
    }

    /// Requests a new token from the authority, applying the retry policy
    ///
    /// The cache is not touched: storing the result is
    /// [`get_valid_token`][Self::get_valid_token]'s job, which keeps this
    /// method reusable for forced refreshes.
    #[tracing::instrument(
        err,
        skip(self),
        fields(
            token_url = %self.config.token_url,
            client_id = %self.config.client_id,
        ),
    )]
    pub async fn request_token(&self) -> Result<Token, TokenRequestError> {
        self.config.validate()?;

        let max_attempts = self.retry.max_attempts().max(1);
        let mut attempt = 1;

        loop {
            if attempt > 1 {
                let delay = self.retry.delay_before_attempt(attempt);
                if !delay.is_zero() {
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "delaying before retry"
                    );
                    tokio::time::sleep(delay).await;
                }
            }

            match self.attempt_request().await {
                Ok(token) => {
                    tracing::info!(
                        attempt,
                        lifetime = token.lifetime().0,
                        expiry = token.expiry().0,
                        "token acquired"
                    );
                    return Ok(token);
                }
                Err(error) => {
                    if self.retry.should_retry(attempt, &error) {
                        tracing::warn!(
                            attempt,
                            error = &error as &dyn error::Error,
                            "token request failed, will retry"
                        );
                        attempt += 1;
                        continue;
                    }

                    return Err(if error.is_transient() && attempt >= max_attempts {
                        TokenRequestError::RetriesExhausted {
                            attempts: attempt,
                            source: Box::new(error),
                        }
                    } else {
                        error
                    });
                }
            }
        }
    }

    async fn attempt_request(&self) -> Result<Token, TokenRequestError> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let response = self
            .transport
            .post_form(
                &self.config.token_url,
                &form,
                Duration::from(self.config.request_timeout),
            )
            .await
            .map_err(TokenRequestError::Network)?;

        if !response.status.is_success() {
            let details = TokenErrorResponse::from_body(&response.body);
            return Err(TokenRequestError::HttpStatus {
                status: response.status,
                error_code: details.error,
                error_description: details.error_description,
            });
        }

        let body: TokenResponse = serde_json::from_slice(&response.body).map_err(|_| {
            TokenRequestError::InvalidResponse {
                reason: InvalidResponseReason::UndecodableBody,
            }
        })?;

        let access_token = body
            .access_token
            .ok_or(TokenRequestError::InvalidResponse {
                reason: InvalidResponseReason::MissingAccessToken,
            })?;
        let expires_in = body.expires_in.ok_or(TokenRequestError::InvalidResponse {
            reason: InvalidResponseReason::MissingExpiresIn,
        })?;
        let token_type = body.token_type.as_deref().unwrap_or("Bearer");

        tracing::debug!(
            token_type,
            expires_in = expires_in.0,
            "token endpoint returned a usable token"
        );

        Ok(self.lifetime_config.create_token(access_token, expires_in))
    }
}
