//! Password hashing using argon2id
//!
//! Hashing and verification are CPU-bound and always run on the blocking
//! thread pool from async code.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;

/// Hash checked when the account does not exist, so unknown emails take as
/// long to reject as wrong passwords.
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| PasswordService::hash("fitcoach-dummy-password").ok());

pub struct PasswordService;

impl PasswordService {
    /// Hash a password (blocking)
    pub fn hash(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| anyhow!("Failed to hash password: {}", e))
    }

    /// Verify a password against a stored PHC string (blocking)
    pub fn verify(password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("Invalid hash format: {}", e))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    pub async fn hash_async(password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| anyhow!("Task join error: {}", e))?
    }

    /// Verify on the blocking pool. With no stored hash the dummy hash is
    /// checked instead and the result is always `false`.
    pub async fn verify_async(password: String, hash: Option<String>) -> Result<bool> {
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => Self::verify(&password, &hash),
            None => {
                if let Some(dummy) = DUMMY_HASH.as_deref() {
                    let _ = Self::verify(&password, dummy);
                }
                Ok(false)
            }
        })
        .await
        .map_err(|e| anyhow!("Task join error: {}", e))?
    }
}
