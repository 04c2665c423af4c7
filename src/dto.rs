//! Wire DTOs for the token endpoint
//!
//! Fields are optional at the serde layer so that a missing field can be
//! reported precisely instead of surfacing as a generic decode error.

use aliri_clock::DurationSecs;
use serde::Deserialize;

use crate::AccessToken;

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<AccessToken>,
    pub token_type: Option<String>,
    pub expires_in: Option<DurationSecs>,
}

/// The standard OAuth2 error body, as much of it as the authority supplied
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TokenErrorResponse {
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl TokenErrorResponse {
    /// Best-effort parse of an error body; anything undecodable is treated
    /// as carrying no details
    pub(crate) fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_fields_are_individually_optional() {
        let parsed: TokenResponse =
            serde_json::from_str(r#"{"token_type":"Bearer","expires_in":3600}"#).unwrap();
        assert!(parsed.access_token.is_none());
        assert_eq!(parsed.token_type.as_deref(), Some("Bearer"));
        assert_eq!(parsed.expires_in.map(|d| d.0), Some(3600));
    }

    #[test]
    fn error_body_parsing_never_fails() {
        let parsed = TokenErrorResponse::from_body(b"not json at all");
        assert!(parsed.error.is_none());

        let parsed = TokenErrorResponse::from_body(
            br#"{"error":"invalid_client","error_description":"bad secret"}"#,
        );
        assert_eq!(parsed.error.as_deref(), Some("invalid_client"));
        assert_eq!(parsed.error_description.as_deref(), Some("bad secret"));
    }
}
