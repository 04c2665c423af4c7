//! The HTTP capability consumed by the token manager
//!
//! The transport only knows how to deliver a form-encoded POST and hand back
//! whatever status and body the server produced. It carries no retry or
//! authentication logic of its own, which keeps the manager's retry loop the
//! single place where failures are classified.

use std::error;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

/// A response received from the token endpoint
///
/// Non-success statuses are still responses; only a failure to produce any
/// response at all is a [`TransportError`].
#[derive(Debug)]
pub struct TransportResponse {
    /// The HTTP status code
    pub status: StatusCode,
    /// The raw response body
    pub body: Vec<u8>,
}

/// An error that prevented an HTTP response from being received
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete within the per-attempt timeout
    #[error("token request timed out")]
    Timeout,

    /// The request could not be sent (connection refused, DNS failure, …)
    #[error("error sending token request")]
    Send(#[source] Box<dyn error::Error + Send + Sync + 'static>),

    /// A response arrived but its body could not be read
    #[error("error reading token response body")]
    Body(#[source] Box<dyn error::Error + Send + Sync + 'static>),
}

/// An asynchronous transport able to POST form-encoded bodies
///
/// Dropping the returned future aborts the in-flight request, so a caller
/// cancelling the surrounding operation releases the underlying connection.
#[async_trait]
pub trait TokenTransport: Send + Sync {
    /// Issues a form-encoded POST to `url`, bounded by `timeout`
    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError>;
}

/// A [`TokenTransport`] backed by a shared [`reqwest::Client`]
#[derive(Clone, Debug, Default)]
pub struct HttpTokenTransport {
    client: reqwest::Client,
}

impl HttpTokenTransport {
    /// Constructs a transport around an existing client
    ///
    /// The client's connection pool is reused across token requests.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TokenTransport for HttpTokenTransport {
    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .form(form)
            .timeout(timeout)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Send(Box::new(error))
                }
            })?;

        let status = response.status();
        tracing::debug!(response.status = status.as_u16(), "received token endpoint response");

        let body = response
            .bytes()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Body(Box::new(error))
                }
            })?
            .to_vec();

        Ok(TransportResponse { status, body })
    }
}
