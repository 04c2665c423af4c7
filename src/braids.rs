use std::fmt;

use aliri_braid::braid;

/// Implements `Debug` and `Display` for a braid reference type such that the
/// protected value is never written out, regardless of formatting flags.
macro_rules! concealed {
    ($ty:ty: $label:literal) => {
        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(concat!("***", $label, "***"))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(concat!("***", $label, "***"))
            }
        }
    };
}

/// A client ID
#[braid(serde)]
pub struct ClientId;

/// A client secret
#[braid(serde, debug = "owned", display = "owned")]
pub struct ClientSecret;

concealed!(ClientSecretRef: "CLIENT SECRET");

/// A bearer access token issued by the authority
#[braid(serde, debug = "owned", display = "owned")]
pub struct AccessToken;

concealed!(AccessTokenRef: "ACCESS TOKEN");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_secret_debug_is_masked() {
        let secret = ClientSecret::from_static("super-secret-value");
        assert_eq!(format!("{:?}", secret), "***CLIENT SECRET***");
        assert_eq!(format!("{}", secret), "***CLIENT SECRET***");
    }

    #[test]
    fn access_token_debug_is_masked() {
        let token = AccessToken::from_static("eyJhbGciOiJSUzI1NiJ9.payload.sig");
        assert_eq!(format!("{:?}", token), "***ACCESS TOKEN***");
        assert_eq!(format!("{:#?}", token), "***ACCESS TOKEN***");
    }

    #[test]
    fn client_id_is_not_masked() {
        let id = ClientId::from_static("my-client");
        assert_eq!(format!("{}", id), "my-client");
    }
}
