//! Password value object.
//!
//! Owns the strength policy and Argon2 hashing for account passwords.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use super::validation::password_strength_error;
use crate::errors::{AppError, AppResult};

/// Hashed password. Never holds the plain text.
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Check the strength policy and hash the plain text.
    ///
    /// # Errors
    /// Returns a validation error naming the first rule the password breaks.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        if let Some(message) = password_strength_error(plain_text) {
            return Err(AppError::validation(message));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?
            .to_string();

        Ok(Self { hash })
    }

    /// Wrap a hash loaded from storage.
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password. A malformed stored hash never verifies.
    pub fn verify(&self, plain_text: &str) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is malformed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let password = Password::new("Hostel2024").unwrap();

        assert!(password.verify("Hostel2024"));
        assert!(!password.verify("hostel2024"));
    }

    #[test]
    fn test_password_from_hash() {
        let password = Password::new("Warden123").unwrap();
        let restored = Password::from_hash(password.as_str().to_string());
        assert!(restored.verify("Warden123"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let first = Password::new("SamePass99").unwrap();
        let second = Password::new("SamePass99").unwrap();

        assert_ne!(first.as_str(), second.as_str());
        assert!(first.verify("SamePass99"));
        assert!(second.verify("SamePass99"));
    }

    #[test]
    fn test_weak_passwords_rejected() {
        assert!(Password::new("Ab1").is_err());
        assert!(Password::new("alllowercase1").is_err());
        assert!(Password::new("NoDigitsHere").is_err());
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        let stored = Password::from_hash("not-a-phc-string".to_string());
        assert!(!stored.verify("anything"));
    }
}
