use serde::Deserialize;
use serde::Serialize;

/// Claims carried by an access token.
///
/// Standard RFC 7519 claims plus the account's email and optional username.
/// The `jti` is fresh per token, so two tokens for the same user issued in
/// the same second still differ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenClaims {
    /// Subject (user identifier)
    pub sub: String,

    /// Account email
    pub email: String,

    /// Account username, when one is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Unique token identifier
    pub jti: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,
}
