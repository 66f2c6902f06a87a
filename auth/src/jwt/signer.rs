use std::fmt::Write as _;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use rand::rngs::OsRng;
use rand::RngCore;
use uuid::Uuid;

use super::claims::AccessTokenClaims;
use super::errors::TokenError;

/// Minimum signing secret length for HS256.
const MIN_SECRET_BYTES: usize = 32;

/// Entropy of a refresh secret before encoding.
const REFRESH_SECRET_BYTES: usize = 32;

/// Settings consumed by [`TokenSigner::new`].
///
/// Built once at startup from the application configuration and passed in
/// explicitly; the signer never reads ambient state.
#[derive(Debug, Clone)]
pub struct TokenSignerSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_token_minutes: i64,
}

/// An access token together with its expiry instant.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates signed access tokens, and generates opaque refresh
/// secrets.
///
/// Uses HS256 (HMAC with SHA-256). Validation checks signature, issuer,
/// audience, and expiry with zero clock-skew leeway, which is stricter than
/// the jsonwebtoken default of 60 seconds.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    issuer: String,
    audience: String,
    access_token_minutes: i64,
}

impl TokenSigner {
    /// Create a new token signer.
    ///
    /// # Errors
    /// * `WeakSecret` - Configured secret is shorter than 32 bytes. This is
    ///   a startup-time failure; a signer that constructs never fails on
    ///   key length again.
    pub fn new(settings: TokenSignerSettings) -> Result<Self, TokenError> {
        let secret = settings.secret.as_bytes();
        if secret.len() < MIN_SECRET_BYTES {
            return Err(TokenError::WeakSecret {
                min: MIN_SECRET_BYTES,
                actual: secret.len(),
            });
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            issuer: settings.issuer,
            audience: settings.audience,
            access_token_minutes: settings.access_token_minutes,
        })
    }

    /// Issue a signed, time-bounded access token for a user.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue_access_token(
        &self,
        user_id: &str,
        username: Option<&str>,
        email: &str,
    ) -> Result<IssuedToken, TokenError> {
        let now = Utc::now();
        let expires_at = now + Duration::minutes(self.access_token_minutes);

        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            username: username.map(str::to_string),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        let header = Header::new(self.algorithm);
        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Generate an opaque refresh secret.
    ///
    /// 256 bits of OS randomness, hex-encoded into a URL-safe string. The
    /// value is never signed; its only meaning comes from the store row it
    /// is compared against.
    pub fn issue_refresh_secret(&self) -> String {
        let mut bytes = [0u8; REFRESH_SECRET_BYTES];
        OsRng.fill_bytes(&mut bytes);

        bytes
            .iter()
            .fold(String::with_capacity(bytes.len() * 2), |mut acc, b| {
                let _ = write!(acc, "{b:02x}");
                acc
            })
    }

    /// Validate a token's signature, issuer, audience, and expiry.
    ///
    /// Returns `false` on any structural or cryptographic failure; never an
    /// error, so callers cannot branch on why a token was rejected.
    pub fn verify(&self, token: &str) -> bool {
        self.decode(token).is_some()
    }

    /// Extract the subject claim from a token.
    ///
    /// Returns `None` unless the token passes full validation; unverified
    /// claims are never surfaced.
    pub fn extract_user_id(&self, token: &str) -> Option<String> {
        self.decode(token).map(|claims| claims.sub)
    }

    /// Extract the username claim from a token, if present and verified.
    pub fn extract_username(&self, token: &str) -> Option<String> {
        self.decode(token).and_then(|claims| claims.username)
    }

    fn decode(&self, token: &str) -> Option<AccessTokenClaims> {
        let mut validation = Validation::new(self.algorithm);
        // No grace period on expiry.
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> TokenSignerSettings {
        TokenSignerSettings {
            secret: "test_secret_key_at_least_32_bytes!".to_string(),
            issuer: "identity-service".to_string(),
            audience: "identity-clients".to_string(),
            access_token_minutes: 15,
        }
    }

    #[test]
    fn test_rejects_short_secret_at_construction() {
        let result = TokenSigner::new(TokenSignerSettings {
            secret: "too_short".to_string(),
            ..settings()
        });

        assert!(matches!(result, Err(TokenError::WeakSecret { .. })));
    }

    #[test]
    fn test_issue_and_verify() {
        let signer = TokenSigner::new(settings()).unwrap();

        let issued = signer
            .issue_access_token("user123", Some("alice"), "alice@example.com")
            .expect("Failed to issue token");

        assert!(!issued.token.is_empty());
        assert!(issued.expires_at > Utc::now());
        assert!(signer.verify(&issued.token));
        assert_eq!(
            signer.extract_user_id(&issued.token).as_deref(),
            Some("user123")
        );
        assert_eq!(
            signer.extract_username(&issued.token).as_deref(),
            Some("alice")
        );
    }

    #[test]
    fn test_tokens_issued_back_to_back_differ() {
        let signer = TokenSigner::new(settings()).unwrap();

        let first = signer
            .issue_access_token("user123", None, "alice@example.com")
            .unwrap();
        let second = signer
            .issue_access_token("user123", None, "alice@example.com")
            .unwrap();

        // Same subject, possibly the same second; the fresh jti still
        // makes every token distinct.
        assert_ne!(first.token, second.token);
        assert!(signer.verify(&first.token));
        assert!(signer.verify(&second.token));
    }

    #[test]
    fn test_username_is_optional() {
        let signer = TokenSigner::new(settings()).unwrap();

        let issued = signer
            .issue_access_token("user123", None, "alice@example.com")
            .unwrap();

        assert!(signer.verify(&issued.token));
        assert_eq!(signer.extract_username(&issued.token), None);
    }

    #[test]
    fn test_verify_garbage_token() {
        let signer = TokenSigner::new(settings()).unwrap();

        assert!(!signer.verify("invalid.token.here"));
        assert!(!signer.verify(""));
        assert_eq!(signer.extract_user_id("invalid.token.here"), None);
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let signer1 = TokenSigner::new(settings()).unwrap();
        let signer2 = TokenSigner::new(TokenSignerSettings {
            secret: "another_secret_key_at_least_32_bytes!".to_string(),
            ..settings()
        })
        .unwrap();

        let issued = signer1
            .issue_access_token("user123", None, "alice@example.com")
            .unwrap();

        assert!(!signer2.verify(&issued.token));
    }

    #[test]
    fn test_verify_wrong_issuer() {
        let issued = TokenSigner::new(TokenSignerSettings {
            issuer: "someone-else".to_string(),
            ..settings()
        })
        .unwrap()
        .issue_access_token("user123", None, "alice@example.com")
        .unwrap();

        let signer = TokenSigner::new(settings()).unwrap();
        assert!(!signer.verify(&issued.token));
        assert_eq!(signer.extract_user_id(&issued.token), None);
    }

    #[test]
    fn test_expired_token_has_no_grace_period() {
        let signer = TokenSigner::new(TokenSignerSettings {
            access_token_minutes: -1,
            ..settings()
        })
        .unwrap();

        let issued = signer
            .issue_access_token("user123", None, "alice@example.com")
            .unwrap();

        assert!(!signer.verify(&issued.token));
        assert_eq!(signer.extract_user_id(&issued.token), None);
    }

    #[test]
    fn test_refresh_secrets_are_unique_and_url_safe() {
        let signer = TokenSigner::new(settings()).unwrap();

        let first = signer.issue_refresh_secret();
        let second = signer.issue_refresh_secret();

        assert_eq!(first.len(), 64);
        assert_ne!(first, second);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
