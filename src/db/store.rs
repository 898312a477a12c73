// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Process-wide document store handle.
//!
//! Opened once at startup and shared through `AppState`; every handler
//! performs at most one logical store operation through it.

use crate::config::{Config, StoreBackend};
use crate::db::firestore::FirestoreBackend;
use crate::db::memory::MemoryStore;
use crate::error::AppError;
use crate::models::document::{sanitize_patch, with_identity};
use crate::models::{DeleteResult, Document, DocumentId, InsertResult, UpdateResult, UserRecord};

#[derive(Clone)]
enum Backend {
    Firestore(FirestoreBackend),
    Memory(MemoryStore),
}

/// Document store client.
#[derive(Clone)]
pub struct DocumentStore {
    backend: Backend,
}

impl DocumentStore {
    /// Open the backend selected by configuration.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        match config.store_backend {
            StoreBackend::Firestore => Self::firestore(&config.gcp_project_id).await,
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory document store; data is lost on restart");
                Ok(Self::in_memory())
            }
        }
    }

    pub async fn firestore(project_id: &str) -> Result<Self, AppError> {
        Ok(Self {
            backend: Backend::Firestore(FirestoreBackend::new(project_id).await?),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(MemoryStore::new()),
        }
    }

    /// Release the handle at shutdown.
    pub async fn close(self) {
        let kind = match &self.backend {
            Backend::Firestore(_) => "firestore",
            Backend::Memory(_) => "memory",
        };
        drop(self);
        tracing::info!(backend = kind, "Document store closed");
    }

    // ─── Credential Operations ───────────────────────────────────

    /// Look up a credential record by exact email.
    pub async fn find_user(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        match &self.backend {
            Backend::Firestore(db) => db.find_user(email).await,
            Backend::Memory(db) => Ok(db.find_user(email)),
        }
    }

    /// Create a credential record; `AppError::Conflict` if the email is taken.
    pub async fn create_user(&self, user: &UserRecord) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(db) => db.create_user(user).await,
            Backend::Memory(db) => db.create_user(user),
        }
    }

    // ─── Resource Document Operations ────────────────────────────

    pub async fn list(&self, collection: &str) -> Result<Vec<Document>, AppError> {
        let docs = match &self.backend {
            Backend::Firestore(db) => db.list(collection).await?,
            Backend::Memory(db) => db.list(collection),
        };
        tracing::debug!(collection, count = docs.len(), "Listed documents");
        Ok(docs)
    }

    pub async fn get(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Document>, AppError> {
        match &self.backend {
            Backend::Firestore(db) => db.get(collection, id).await,
            Backend::Memory(db) => Ok(db.get(collection, id)),
        }
    }

    /// Insert a caller body verbatim under a freshly assigned identity.
    pub async fn insert(&self, collection: &str, body: Document) -> Result<InsertResult, AppError> {
        let id = DocumentId::generate();
        let doc = with_identity(body, id);

        match &self.backend {
            Backend::Firestore(db) => db.insert(collection, &id, &doc).await?,
            Backend::Memory(db) => db.insert(collection, doc),
        }

        tracing::debug!(collection, id = %id, "Inserted document");
        Ok(InsertResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    /// Merge-patch update; only the fields present in `patch` are overwritten.
    pub async fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        patch: Document,
    ) -> Result<UpdateResult, AppError> {
        let patch = sanitize_patch(patch);
        let result = match &self.backend {
            Backend::Firestore(db) => db.update(collection, id, &patch).await?,
            Backend::Memory(db) => db.update(collection, id, &patch),
        };
        tracing::debug!(
            collection,
            id = %id,
            matched = result.matched_count,
            modified = result.modified_count,
            "Updated document"
        );
        Ok(result)
    }

    pub async fn delete(&self, collection: &str, id: &DocumentId) -> Result<DeleteResult, AppError> {
        let result = match &self.backend {
            Backend::Firestore(db) => db.delete(collection, id).await?,
            Backend::Memory(db) => db.delete(collection, id),
        };
        tracing::debug!(
            collection,
            id = %id,
            deleted = result.deleted_count,
            "Deleted document"
        );
        Ok(result)
    }
}
