// Password hashing and verification service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::auth::error::AuthError;

/// Password service for hashing and verification, backed by Argon2id
pub struct PasswordService;

impl PasswordService {
    /// Hash a password with a fresh random salt
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::PasswordHashError)
    }

    /// Verify a password against a stored hash
    ///
    /// A malformed stored hash verifies false rather than erroring, so
    /// callers can treat any mismatch as plain bad credentials.
    pub fn verify_password(password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify_roundtrip() {
        let hash = PasswordService::hash_password("secret1").unwrap();
        assert!(PasswordService::verify_password("secret1", &hash));
    }

    #[test]
    fn test_wrong_password_is_rejected() {
        let hash = PasswordService::hash_password("secret1").unwrap();
        assert!(!PasswordService::verify_password("secret2", &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let first = PasswordService::hash_password("secret1").unwrap();
        let second = PasswordService::hash_password("secret1").unwrap();

        // Fresh salt each time, so two hashes of the same input differ
        assert_ne!(first, second);
        assert!(PasswordService::verify_password("secret1", &first));
        assert!(PasswordService::verify_password("secret1", &second));
    }

    #[test]
    fn test_hash_never_contains_plaintext() {
        let hash = PasswordService::hash_password("hunter2000").unwrap();
        assert!(!hash.contains("hunter2000"));
    }

    #[test]
    fn test_malformed_hash_verifies_false() {
        assert!(!PasswordService::verify_password("secret1", ""));
        assert!(!PasswordService::verify_password("secret1", "not-a-phc-string"));
        assert!(!PasswordService::verify_password(
            "secret1",
            "$argon2id$v=19$truncated"
        ));
    }
}
