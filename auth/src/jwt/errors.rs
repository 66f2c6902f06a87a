use thiserror::Error;

/// Error type for token signing operations.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    #[error("Signing secret too short: need at least {min} bytes, got {actual}")]
    WeakSecret { min: usize, actual: usize },

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),
}
