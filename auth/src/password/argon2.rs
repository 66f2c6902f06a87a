use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Memory cost in KiB. Together with the iteration count this targets
/// roughly 200-400ms per hash on commodity hardware; raise when hardware
/// catches up.
const MEMORY_COST_KIB: u32 = 19_456;
const ITERATIONS: u32 = 2;
const PARALLELISM: u32 = 1;

/// Password hashing implementation.
///
/// Produces PHC-format Argon2id hashes with a fresh random salt per call,
/// so hashing the same password twice yields different strings.
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create a new password hasher with the fixed work factor.
    pub fn new() -> Self {
        let params = Params::new(MEMORY_COST_KIB, ITERATIONS, PARALLELISM, None)
            .expect("Argon2 work-factor constants are valid");

        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hash a plaintext password securely.
    ///
    /// # Errors
    /// * `EmptyPassword` - Password is empty or whitespace-only
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.trim().is_empty() {
            return Err(PasswordError::EmptyPassword);
        }

        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// A malformed or foreign hash string yields `Ok(false)` rather than an
    /// error, so callers cannot distinguish "wrong password" from "hash we
    /// do not recognize". Comparison itself goes through the argon2 crate's
    /// constant-time verifier.
    ///
    /// # Errors
    /// * `EmptyPassword` - Password argument is blank
    /// * `EmptyHash` - Hash argument is blank
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        if password.trim().is_empty() {
            return Err(PasswordError::EmptyPassword);
        }
        if hash.trim().is_empty() {
            return Err(PasswordError::EmptyHash);
        }

        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return Ok(false);
        };

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let password = "Str0ng!Pass";

        let hash = hasher.hash(password).expect("Failed to hash password");
        assert_ne!(hash, password);

        assert!(hasher
            .verify(password, &hash)
            .expect("Failed to verify password"));

        assert!(!hasher
            .verify("wrong_password", &hash)
            .expect("Failed to verify password"));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = PasswordHasher::new();
        let password = "repeated_password";

        let first = hasher.hash(password).expect("Failed to hash password");
        let second = hasher.hash(password).expect("Failed to hash password");

        assert_ne!(first, second);
        assert!(hasher.verify(password, &first).unwrap());
        assert!(hasher.verify(password, &second).unwrap());
    }

    #[test]
    fn test_hash_empty_password() {
        let hasher = PasswordHasher::new();

        assert!(matches!(hasher.hash(""), Err(PasswordError::EmptyPassword)));
        assert!(matches!(
            hasher.hash("   "),
            Err(PasswordError::EmptyPassword)
        ));
    }

    #[test]
    fn test_verify_blank_arguments() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("password").unwrap();

        assert!(matches!(
            hasher.verify("", &hash),
            Err(PasswordError::EmptyPassword)
        ));
        assert!(matches!(
            hasher.verify("password", " "),
            Err(PasswordError::EmptyHash)
        ));
    }

    #[test]
    fn test_verify_malformed_hash_is_false_not_error() {
        let hasher = PasswordHasher::new();

        let result = hasher.verify("password", "not-a-phc-string");
        assert_eq!(result.unwrap(), false);
    }
}
