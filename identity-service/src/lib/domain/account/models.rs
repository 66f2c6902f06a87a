use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::account::errors::UserIdError;

/// User aggregate entity.
///
/// Represents a registered account. The password hash is an opaque PHC
/// string; the plaintext never reaches this type.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// Entry point for the transport layer, which receives ids as path
    /// parameters or token subjects and must parse them before calling
    /// into the service port.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Refresh token unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RefreshTokenId(pub Uuid);

impl RefreshTokenId {
    /// Generate a new random refresh token ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RefreshTokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RefreshTokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Refresh token entity.
///
/// The row id and the secret `token` value are distinct: the secret is the
/// lookup key handed to clients, the id is internal. Revocation is
/// monotonic; once `is_revoked` is set it never flips back.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub id: RefreshTokenId,
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub is_revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Whether the token's natural lifetime has elapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// A token is valid when it is neither expired nor revoked.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now) && !self.is_revoked
    }

    /// Mark the token revoked at `now`. Idempotent: an already-revoked
    /// token keeps its original `revoked_at`.
    pub fn revoke(&mut self, now: DateTime<Utc>) {
        if !self.is_revoked {
            self.is_revoked = true;
            self.revoked_at = Some(now);
            self.updated_at = now;
        }
    }
}

/// Command to register a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: Option<String>,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Audit metadata about the caller, recorded on each refresh token row.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Result of a successful register/login/refresh operation.
#[derive(Debug, Clone)]
pub struct AuthSuccess {
    pub user: User,
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn token(expires_in: Duration) -> RefreshToken {
        let now = Utc::now();
        RefreshToken {
            id: RefreshTokenId::new(),
            token: "secret".to_string(),
            user_id: UserId::new(),
            expires_at: now + expires_in,
            is_revoked: false,
            revoked_at: None,
            ip_address: None,
            user_agent: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_user_id_string_round_trip() {
        let id = UserId::new();
        let parsed = UserId::from_string(&id.to_string()).expect("Failed to parse id");
        assert_eq!(parsed, id);

        assert!(matches!(
            UserId::from_string("not-a-uuid"),
            Err(UserIdError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_validity_lifecycle() {
        let now = Utc::now();

        let live = token(Duration::days(7));
        assert!(live.is_valid(now));

        let expired = token(Duration::seconds(-1));
        assert!(expired.is_expired(now));
        assert!(!expired.is_valid(now));

        let mut revoked = token(Duration::days(7));
        revoked.revoke(now);
        assert!(!revoked.is_valid(now));
        assert_eq!(revoked.revoked_at, Some(now));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let t = token(Duration::zero());
        assert!(t.is_expired(t.expires_at));
        assert!(!t.is_valid(t.expires_at));
    }

    #[test]
    fn test_revoke_is_monotonic() {
        let mut t = token(Duration::days(7));
        let first = Utc::now();
        t.revoke(first);

        let later = first + Duration::seconds(30);
        t.revoke(later);

        assert!(t.is_revoked);
        assert_eq!(t.revoked_at, Some(first));
    }
}
