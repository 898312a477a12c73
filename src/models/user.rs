//! Credential record for storage.

use serde::{Deserialize, Serialize};

/// Registered user stored in the `users` collection.
///
/// The email is the unique key; the record is never updated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    /// Display name
    pub name: String,
    /// Email address, matched exactly
    pub email: String,
    /// Argon2id PHC string, never the plaintext
    pub password_hash: String,
}
