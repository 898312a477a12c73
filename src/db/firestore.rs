// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore backend.
//!
//! - Credential records live in `users`, keyed by `user_` plus the URL-encoded
//!   email, so the store itself enforces one record per email.
//! - Resource documents are keyed by their `_id`, which is also kept as a field.

use crate::db::{collections, USER_EXISTS};
use crate::error::AppError;
use crate::models::document::merge_patch;
use crate::models::{DeleteResult, Document, DocumentId, UpdateResult, UserRecord};
use firestore::errors::FirestoreError;
use firestore::FirestoreWritePrecondition;

/// Prefix of the metadata fields the Firestore deserializer injects.
const METADATA_PREFIX: &str = "_firestore_";

/// Prefix of every credential document ID.
const USER_DOC_PREFIX: &str = "user_";

/// Firestore rejects document IDs longer than this many bytes.
const MAX_DOC_ID_BYTES: usize = 1500;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreBackend {
    client: firestore::FirestoreDb,
}

impl FirestoreBackend {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    // ─── Credential Operations ───────────────────────────────────

    pub async fn find_user(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        // No record can exist under a key the store would refuse
        let Some(doc_id) = user_doc_id(email) else {
            return Ok(None);
        };

        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(&doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a credential record. Insert semantics: an existing key is a conflict.
    pub async fn create_user(&self, user: &UserRecord) -> Result<(), AppError> {
        let doc_id = user_doc_id(&user.email)
            .ok_or_else(|| AppError::BadRequest("Email is too long".to_string()))?;

        let result: Result<UserRecord, FirestoreError> = self
            .client
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(doc_id)
            .object(user)
            .execute()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(FirestoreError::DataConflictError(_)) => {
                Err(AppError::Conflict(USER_EXISTS.to_string()))
            }
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    // ─── Resource Document Operations ────────────────────────────

    /// All documents in the collection, in Firestore's native (document ID) order.
    pub async fn list(&self, collection: &str) -> Result<Vec<Document>, AppError> {
        let docs: Vec<Document> = self
            .client
            .fluent()
            .select()
            .from(collection)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(docs.into_iter().map(strip_metadata).collect())
    }

    pub async fn get(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Document>, AppError> {
        let doc: Option<Document> = self
            .client
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(&id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(doc.map(strip_metadata))
    }

    /// Store a document that already carries its `_id`.
    pub async fn insert(
        &self,
        collection: &str,
        id: &DocumentId,
        doc: &Document,
    ) -> Result<(), AppError> {
        let _: Document = self
            .client
            .fluent()
            .insert()
            .into(collection)
            .document_id(id.to_string())
            .object(doc)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Merge-patch the top-level fields of `patch` into an existing document.
    ///
    /// Only the patched fields are written (update mask), and nothing is
    /// written when the document is missing or would not change.
    pub async fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        patch: &Document,
    ) -> Result<UpdateResult, AppError> {
        let Some(mut current) = self.get(collection, id).await? else {
            return Ok(UpdateResult {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
            });
        };

        if !merge_patch(&mut current, patch) {
            return Ok(UpdateResult {
                acknowledged: true,
                matched_count: 1,
                modified_count: 0,
            });
        }

        let written = self.write_patch(collection, id, patch).await?;

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: u64::from(written),
            modified_count: u64::from(written),
        })
    }

    /// Write only the fields in `patch`, provided the document still exists.
    ///
    /// Returns `false` when it was deleted in the meantime; a masked update
    /// without the precondition would recreate it.
    async fn write_patch(
        &self,
        collection: &str,
        id: &DocumentId,
        patch: &Document,
    ) -> Result<bool, AppError> {
        let result: Result<Document, FirestoreError> = self
            .client
            .fluent()
            .update()
            .fields(patch.keys().map(|key| field_path(key)))
            .in_col(collection)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(id.to_string())
            .object(patch)
            .execute()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(FirestoreError::DataNotFoundError(_)) => {
                tracing::info!(
                    collection,
                    id = %id,
                    "Update skipped: document deleted concurrently"
                );
                Ok(false)
            }
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    pub async fn delete(&self, collection: &str, id: &DocumentId) -> Result<DeleteResult, AppError> {
        let existed = self.get(collection, id).await?.is_some();

        self.client
            .fluent()
            .delete()
            .from(collection)
            .document_id(id.to_string())
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: u64::from(existed),
        })
    }
}

/// Document ID for a credential record.
///
/// Firestore IDs may not contain `/`, be `.` or `..`, or match `__.*__`; the
/// prefix keeps every email clear of the reserved forms, including the empty
/// one. `None` if the result would exceed the ID size limit.
fn user_doc_id(email: &str) -> Option<String> {
    let id = format!("{}{}", USER_DOC_PREFIX, urlencoding::encode(email));
    (id.len() <= MAX_DOC_ID_BYTES).then_some(id)
}

/// Quote a field name for use in an update mask unless it is a simple identifier.
fn field_path(key: &str) -> String {
    let mut chars = key.chars();
    let simple = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if simple {
        key.to_string()
    } else {
        format!("`{}`", key.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

fn strip_metadata(mut doc: Document) -> Document {
    doc.retain(|key, _| !key.starts_with(METADATA_PREFIX));
    doc
}
