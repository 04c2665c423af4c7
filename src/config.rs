//! Configuration for the client credentials exchange

use aliri_clock::DurationSecs;
use serde::Deserialize;

use crate::error::TokenRequestError;
use crate::{ClientId, ClientSecret};

/// Configuration for requesting tokens from an OAuth2 authority
///
/// All fields arrive pre-parsed from whatever configuration layer the
/// application uses; this type only validates that the required values are
/// actually present before a request is attempted.
#[derive(Clone, Debug, Deserialize)]
pub struct OAuthConfig {
    /// The client ID presented to the authority
    pub client_id: ClientId,

    /// The client secret presented to the authority
    pub client_secret: ClientSecret,

    /// The authority's token endpoint URL
    pub token_url: String,

    /// Safety margin subtracted from each token's reported lifetime
    #[serde(default = "default_expiration_buffer")]
    pub expiration_buffer: DurationSecs,

    /// Maximum attempts per token request, including the first
    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,

    /// Per-attempt timeout for the HTTP exchange
    #[serde(default = "default_request_timeout")]
    pub request_timeout: DurationSecs,
}

fn default_expiration_buffer() -> DurationSecs {
    DurationSecs(300)
}

fn default_max_retry_attempts() -> u32 {
    3
}

fn default_request_timeout() -> DurationSecs {
    DurationSecs(30)
}

impl OAuthConfig {
    /// Constructs a configuration with the default buffer, retry, and
    /// timeout settings
    pub fn new(client_id: ClientId, client_secret: ClientSecret, token_url: String) -> Self {
        Self {
            client_id,
            client_secret,
            token_url,
            expiration_buffer: default_expiration_buffer(),
            max_retry_attempts: default_max_retry_attempts(),
            request_timeout: default_request_timeout(),
        }
    }

    /// Verifies that every field required for a token request is non-empty
    pub fn validate(&self) -> Result<(), TokenRequestError> {
        if self.client_id.as_str().is_empty() {
            return Err(TokenRequestError::Configuration { field: "client_id" });
        }
        if self.client_secret.as_str().is_empty() {
            return Err(TokenRequestError::Configuration {
                field: "client_secret",
            });
        }
        if self.token_url.is_empty() {
            return Err(TokenRequestError::Configuration { field: "token_url" });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OAuthConfig {
        OAuthConfig::new(
            ClientId::from_static("client"),
            ClientSecret::from_static("secret"),
            "https://auth.example.com/oauth/token".to_owned(),
        )
    }

    #[test]
    fn complete_configuration_validates() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn missing_fields_are_reported_by_name() {
        let mut cfg = config();
        cfg.client_id = ClientId::from_static("");
        assert!(matches!(
            cfg.validate(),
            Err(TokenRequestError::Configuration { field: "client_id" })
        ));

        let mut cfg = config();
        cfg.client_secret = ClientSecret::from_static("");
        assert!(matches!(
            cfg.validate(),
            Err(TokenRequestError::Configuration {
                field: "client_secret"
            })
        ));

        let mut cfg = config();
        cfg.token_url = String::new();
        assert!(matches!(
            cfg.validate(),
            Err(TokenRequestError::Configuration { field: "token_url" })
        ));
    }

    #[test]
    fn defaults_apply_when_fields_are_omitted() {
        let cfg: OAuthConfig = serde_json::from_value(serde_json::json!({
            "client_id": "client",
            "client_secret": "secret",
            "token_url": "https://auth.example.com/oauth/token",
        }))
        .unwrap();

        assert_eq!(cfg.expiration_buffer.0, 300);
        assert_eq!(cfg.max_retry_attempts, 3);
        assert_eq!(cfg.request_timeout.0, 30);
    }
}
