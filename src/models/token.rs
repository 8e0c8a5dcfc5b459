//! Access token models.

use serde::Deserialize;

/// Payload of a successful `gettoken` call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessTokenResponse {
    /// The bearer token.
    #[serde(default)]
    pub access_token: String,

    /// Lifetime of the token in seconds (7200 in practice).
    #[serde(default)]
    pub expires_in: u64,
}

/// A short-lived bearer credential required by authenticated operations.
///
/// `Debug` output hides the token value.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// The token string sent as the `access_token` query parameter.
    pub value: String,

    /// Lifetime reported by the server, in seconds.
    pub expires_in: u64,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

impl From<AccessTokenResponse> for AccessToken {
    fn from(response: AccessTokenResponse) -> Self {
        Self {
            value: response.access_token,
            expires_in: response.expires_in,
        }
    }
}
