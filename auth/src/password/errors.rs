use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("Password hash must not be empty")]
    EmptyHash,

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}
