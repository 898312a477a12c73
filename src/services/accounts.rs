// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration and login.
//!
//! Registration never issues a token. Login failures are reported with a
//! single error whatever the cause, so callers cannot tell which emails are
//! registered. There is no rate limiting or lockout.

use crate::config::Config;
use crate::db::{DocumentStore, USER_EXISTS};
use crate::error::AppError;
use crate::middleware::auth::create_jwt;
use crate::models::UserRecord;
use crate::services::password::{hash_password_blocking, verify_password_blocking};

/// Account operations over the credential store.
pub struct AccountService<'a> {
    db: &'a DocumentStore,
    config: &'a Config,
}

impl<'a> AccountService<'a> {
    pub fn new(db: &'a DocumentStore, config: &'a Config) -> Self {
        Self { db, config }
    }

    /// Register a new credential record.
    ///
    /// The email is looked up before anything is written; a taken email is a
    /// `Conflict`. The store also rejects the insert if a concurrent
    /// registration for the same email won the race.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: String,
    ) -> Result<(), AppError> {
        if self.db.find_user(email).await?.is_some() {
            tracing::info!(email, "Registration rejected: email already registered");
            return Err(AppError::Conflict(USER_EXISTS.to_string()));
        }

        let password_hash = hash_password_blocking(password).await?;

        self.db
            .create_user(&UserRecord {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await?;

        tracing::info!(email, "User registered");
        Ok(())
    }

    /// Check credentials and issue an access token for the stored email.
    pub async fn login(&self, email: &str, password: String) -> Result<String, AppError> {
        let Some(user) = self.db.find_user(email).await? else {
            tracing::info!("Login rejected");
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password_blocking(password, user.password_hash).await? {
            tracing::info!("Login rejected");
            return Err(AppError::InvalidCredentials);
        }

        let token = create_jwt(
            &user.email,
            &self.config.jwt_signing_key,
            self.config.token_ttl,
        )?;

        tracing::info!(email = %user.email, "Login successful");
        Ok(token)
    }

    /// Fetch the credential record behind an authenticated email.
    pub async fn profile(&self, email: &str) -> Result<UserRecord, AppError> {
        self.db
            .find_user(email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", email)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::verify_jwt;

    #[tokio::test]
    async fn test_register_then_login() {
        let db = DocumentStore::in_memory();
        let config = Config::default();
        let accounts = AccountService::new(&db, &config);

        accounts
            .register("Ada", "ada@example.com", "correct horse".to_string())
            .await
            .unwrap();

        let stored = db.find_user("ada@example.com").await.unwrap().unwrap();
        assert_eq!(stored.name, "Ada");
        assert_ne!(stored.password_hash, "correct horse");

        let token = accounts
            .login("ada@example.com", "correct horse".to_string())
            .await
            .unwrap();
        let claims = verify_jwt(&token, &config.jwt_signing_key).unwrap();
        assert_eq!(claims.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_registration_keeps_first_record() {
        let db = DocumentStore::in_memory();
        let config = Config::default();
        let accounts = AccountService::new(&db, &config);

        accounts
            .register("First", "dup@example.com", "one".to_string())
            .await
            .unwrap();
        let err = accounts
            .register("Second", "dup@example.com", "two".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let stored = db.find_user("dup@example.com").await.unwrap().unwrap();
        assert_eq!(stored.name, "First");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let db = DocumentStore::in_memory();
        let config = Config::default();
        let accounts = AccountService::new(&db, &config);
        accounts
            .register("Ada", "ada@example.com", "right".to_string())
            .await
            .unwrap();

        let wrong_password = accounts
            .login("ada@example.com", "wrong".to_string())
            .await
            .unwrap_err();
        let unknown_email = accounts
            .login("nobody@example.com", "right".to_string())
            .await
            .unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.kind(), unknown_email.kind());
    }
}
