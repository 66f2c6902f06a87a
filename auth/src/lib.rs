//! Authentication primitives library
//!
//! Provides reusable authentication infrastructure:
//! - Password hashing (Argon2id)
//! - JWT access-token issuance and validation
//! - Opaque refresh-secret generation
//!
//! The service crate composes these primitives into the full
//! register/login/refresh/logout flows; this crate stays free of any
//! persistence or transport concerns.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::{TokenSigner, TokenSignerSettings};
//!
//! let signer = TokenSigner::new(TokenSignerSettings {
//!     secret: "secret_key_at_least_32_bytes_long!!".to_string(),
//!     issuer: "identity-service".to_string(),
//!     audience: "identity-clients".to_string(),
//!     access_token_minutes: 15,
//! })
//! .unwrap();
//!
//! let issued = signer
//!     .issue_access_token("user123", Some("alice"), "alice@example.com")
//!     .unwrap();
//! assert!(signer.verify(&issued.token));
//! assert_eq!(signer.extract_user_id(&issued.token).as_deref(), Some("user123"));
//! ```

pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use jwt::AccessTokenClaims;
pub use jwt::IssuedToken;
pub use jwt::TokenError;
pub use jwt::TokenSigner;
pub use jwt::TokenSignerSettings;
pub use password::PasswordError;
pub use password::PasswordHasher;
