//! The error taxonomy for token acquisition
//!
//! Every failure path is classified as either transient (worth retrying) or
//! permanent (retrying cannot help). The retry policy consults this
//! classification rather than inspecting errors itself.

use reqwest::StatusCode;
use thiserror::Error;

use crate::transport::TransportError;

/// An error while attempting to obtain a token from the authority
#[derive(Debug, Error)]
pub enum TokenRequestError {
    /// A required configuration value is missing, so no request was attempted
    #[error("client credentials configuration is incomplete: `{field}` is empty")]
    Configuration {
        /// The name of the missing configuration field
        field: &'static str,
    },

    /// The request never produced an HTTP response
    #[error("error communicating with the token endpoint")]
    Network(#[source] TransportError),

    /// The authority answered with a non-success status
    #[error("token endpoint returned HTTP {status}")]
    HttpStatus {
        /// The status code returned by the authority
        status: StatusCode,
        /// The OAuth `error` code from the response body, if one was present
        error_code: Option<String>,
        /// The OAuth `error_description` from the response body, if present
        error_description: Option<String>,
    },

    /// The authority reported success but the body was not a usable token
    /// response
    #[error("token response is malformed: {reason}")]
    InvalidResponse {
        /// What made the response unusable
        reason: InvalidResponseReason,
    },

    /// All retry attempts were exhausted without obtaining a token
    #[error("token request failed after {attempts} attempts")]
    RetriesExhausted {
        /// How many attempts were made
        attempts: u32,
        /// The error from the final attempt
        #[source]
        source: Box<TokenRequestError>,
    },
}

/// The reason a success response could not be used as a token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidResponseReason {
    /// The body was not decodable as JSON
    UndecodableBody,
    /// The body had no `access_token` field
    MissingAccessToken,
    /// The body had no `expires_in` field
    MissingExpiresIn,
}

impl std::fmt::Display for InvalidResponseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::UndecodableBody => f.write_str("body is not valid JSON"),
            Self::MissingAccessToken => f.write_str("missing `access_token` field"),
            Self::MissingExpiresIn => f.write_str("missing `expires_in` field"),
        }
    }
}

impl TokenRequestError {
    /// Reports whether a retry could plausibly succeed
    ///
    /// Network failures are transient, as are rate limiting (429), server
    /// errors (5xx), and any other unexpected status. Credential rejections
    /// (400, 401, 403), malformed responses, and missing configuration are
    /// permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::HttpStatus { status, .. } => {
                !matches!(status.as_u16(), 400 | 401 | 403)
            }
            Self::Configuration { .. } | Self::InvalidResponse { .. } => false,
            Self::RetriesExhausted { .. } => false,
        }
    }
}
