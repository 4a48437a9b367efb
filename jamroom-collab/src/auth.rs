use argon2::{
    password_hash::{Encoding, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use rand::rngs::OsRng;
use thiserror::Error;

/// Hashes and checks room passwords. Plaintext passwords are never stored.
pub struct Auth {
    argon: Argon2<'static>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// The password does not match
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("HashError: {0}")]
    HashError(String),
}

impl Auth {
    pub fn new() -> Self {
        Self {
            argon: Argon2::default(),
        }
    }

    /// Returns a PHC string for the password
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashError(e.to_string()))
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<(), AuthError> {
        let stored_password = PasswordHash::parse(hash, Encoding::default())
            .map_err(|e| AuthError::HashError(e.to_string()))?;

        self.argon
            .verify_password(password.as_bytes(), &stored_password)
            .map_err(|_| AuthError::InvalidCredentials)
    }
}

impl Default for Auth {
    fn default() -> Self {
        Self::new()
    }
}
