//! Password hashing and verification
//!
//! Passwords are hashed with Argon2 using the crate's default (fixed)
//! parameters and a fresh random salt per hash. Both operations are CPU bound
//! and run on the blocking thread pool.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString},
};
use thiserror::Error;
use tokio::sync::OnceCell;

static DECOY_HASH: OnceCell<HashedPassword> = OnceCell::const_new();

/// A one-way password hash in PHC string format.
///
/// Only [`hash_password`] produces values of this type, so a `HashedPassword`
/// can never carry a plaintext password.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HashedPassword(..)")
    }
}

/// Password hashing errors
#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Failed to parse password hash: {0}")]
    MalformedHash(String),

    #[error("Password task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Hash a password with a fresh salt
pub fn hash_password(password: &str) -> Result<HashedPassword, PasswordError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;

    Ok(HashedPassword(hash.to_string()))
}

/// Verify a password against a stored hash
///
/// A mismatch is `Ok(false)`; only a malformed stored hash is an error.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(stored_hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::MalformedHash(e.to_string())),
    }
}

/// [`hash_password`] on the blocking pool
pub async fn hash(password: String) -> Result<HashedPassword, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password)).await?
}

/// [`verify_password`] on the blocking pool
pub async fn verify(password: String, stored_hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash)).await?
}

/// Hash of a throwaway password, computed once
///
/// Verifying against it when no user matches costs the same as a real
/// mismatch, so response times do not reveal which usernames exist.
pub async fn decoy_hash() -> Result<&'static HashedPassword, PasswordError> {
    DECOY_HASH
        .get_or_try_init(|| hash("no-such-user".to_string()))
        .await
}

#[cfg(test)]
pub(crate) fn decoy_hash_ready() -> bool {
    DECOY_HASH.initialized()
}
