//! Argon2id password hashing.
//!
//! Hashes are stored in PHC string form (`$argon2id$v=19$...`) so parameters
//! travel with the hash and can be raised later without a migration.

use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use zeroize::Zeroizing;

/// Minimum accepted password length in characters.
pub const PASSWORD_MIN: usize = 8;

/// Failures raised while hashing or parsing stored hashes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    /// The plaintext is shorter than [`PASSWORD_MIN`].
    #[error("password must be at least {min} characters")]
    TooShort { min: usize },
    /// The confirmation does not match.
    #[error("passwords do not match")]
    Mismatch,
    /// Hashing failed inside the Argon2 implementation.
    #[error("failed to hash password: {message}")]
    Hash { message: String },
    /// The stored hash is not a valid PHC string.
    #[error("stored password hash is malformed: {message}")]
    Malformed { message: String },
}

/// Plaintext password validated against the length policy.
///
/// The buffer is wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct NewPassword(Zeroizing<String>);

impl NewPassword {
    /// Validate `password` and its confirmation.
    pub fn new(password: &str, confirmation: &str) -> Result<Self, PasswordError> {
        if password.chars().count() < PASSWORD_MIN {
            return Err(PasswordError::TooShort { min: PASSWORD_MIN });
        }
        if password != confirmation {
            return Err(PasswordError::Mismatch);
        }
        Ok(Self(Zeroizing::new(password.to_owned())))
    }

    /// Hash the password with a fresh random salt.
    pub fn hash(&self) -> Result<PasswordHash, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(self.0.as_bytes(), &salt)
            .map(|hash| PasswordHash(hash.to_string()))
            .map_err(|err| PasswordError::Hash {
                message: err.to_string(),
            })
    }
}

impl fmt::Debug for NewPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NewPassword(***)")
    }
}

/// Stored PHC-format password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash loaded from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// PHC string for persistence.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Check `candidate` against the stored hash.
    pub fn verify(&self, candidate: &str) -> Result<bool, PasswordError> {
        let parsed = argon2::PasswordHash::new(&self.0).map_err(|err| PasswordError::Malformed {
            message: err.to_string(),
        })?;
        Ok(Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok())
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(***)")
    }
}
