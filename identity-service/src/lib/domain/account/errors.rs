use auth::PasswordError;
use auth::TokenError;
use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Errors surfaced by the persistence ports.
///
/// Unique-constraint violations get their own variants so the orchestrator
/// can convert a late race (pre-check passed, insert still collided) into
/// the same conflict failure as the pre-check itself.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Email already exists: {0}")]
    DuplicateEmail(String),

    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    #[error("Refresh token value already exists")]
    DuplicateToken,

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Top-level failure type for all authentication operations.
///
/// Every public operation returns `Result<_, AuthError>`; store failures
/// never escape as-is. Message texts matter: `InvalidCredentials` is
/// deliberately identical for "no such user" and "wrong password"
/// (enumeration resistance), and `RefreshTokenNotActive` does not say
/// whether the token was expired or revoked.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Username already exists")]
    UsernameAlreadyExists,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account is deactivated")]
    AccountDeactivated,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Refresh token is expired or revoked")]
    RefreshTokenNotActive,

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Unexpected(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(_) => AuthError::EmailAlreadyExists,
            StoreError::DuplicateUsername(_) => AuthError::UsernameAlreadyExists,
            other => {
                tracing::error!(error = %other, "Store operation failed");
                AuthError::Unexpected(other.to_string())
            }
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::EmptyPassword | PasswordError::EmptyHash => {
                AuthError::Validation(err.to_string())
            }
            PasswordError::HashingFailed(_) => AuthError::Unexpected(err.to_string()),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        AuthError::Unexpected(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::Unexpected(err.to_string())
    }
}
