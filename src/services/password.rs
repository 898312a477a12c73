// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password hashing with Argon2id.
//!
//! Hashes are PHC strings carrying their own salt and parameters. Both
//! hashing and verification are CPU-bound and run on the blocking pool.

use crate::error::AppError;
use anyhow::Context;
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

fn hasher() -> Argon2<'static> {
    Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2::Params::default(),
    )
}

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?
        .to_string();
    Ok(hash)
}

/// Verify a plaintext password against a stored PHC string.
///
/// A malformed stored hash verifies as `false`.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        tracing::warn!("Stored password hash is not a valid PHC string");
        return false;
    };
    hasher()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// [`hash_password`] on the blocking thread pool.
pub async fn hash_password_blocking(password: String) -> Result<String, AppError> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("password hashing task failed")??;
    Ok(hash)
}

/// [`verify_password`] on the blocking thread pool.
pub async fn verify_password_blocking(
    password: String,
    stored_hash: String,
) -> Result<bool, AppError> {
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .context("password verification task failed")?;
    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_salted_and_verifiable() {
        let first = hash_password("hunter2").unwrap();
        let second = hash_password("hunter2").unwrap();

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second, "salts must differ");
        assert!(!first.contains("hunter2"));

        assert!(verify_password("hunter2", &first));
        assert!(verify_password("hunter2", &second));
        assert!(!verify_password("hunter3", &first));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("", ""));
    }

    #[tokio::test]
    async fn test_blocking_wrappers() {
        let hash = hash_password_blocking("s3cret".to_string()).await.unwrap();
        assert!(verify_password_blocking("s3cret".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password_blocking("wrong".to_string(), hash)
            .await
            .unwrap());
    }
}
