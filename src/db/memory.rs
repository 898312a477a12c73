// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store for local development and tests.
//!
//! Each collection keeps its documents in insertion order, which is the
//! order `list` returns. Per-collection locking comes from `DashMap` shards;
//! no lock is held across an await point.

use crate::db::USER_EXISTS;
use crate::error::AppError;
use crate::models::document::{merge_patch, ID_FIELD};
use crate::models::{DeleteResult, Document, DocumentId, UpdateResult, UserRecord};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<DashMap<String, UserRecord>>,
    collections: Arc<DashMap<String, Vec<Document>>>,
}

fn has_id(doc: &Document, id: &str) -> bool {
    doc.get(ID_FIELD).and_then(|v| v.as_str()) == Some(id)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_user(&self, email: &str) -> Option<UserRecord> {
        self.users.get(email).map(|user| user.clone())
    }

    pub fn create_user(&self, user: &UserRecord) -> Result<(), AppError> {
        match self.users.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict(USER_EXISTS.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }

    pub fn list(&self, collection: &str) -> Vec<Document> {
        self.collections
            .get(collection)
            .map(|docs| docs.clone())
            .unwrap_or_default()
    }

    pub fn get(&self, collection: &str, id: &DocumentId) -> Option<Document> {
        let id = id.to_string();
        self.collections
            .get(collection)?
            .iter()
            .find(|doc| has_id(doc, &id))
            .cloned()
    }

    /// Append a document that already carries its `_id`.
    pub fn insert(&self, collection: &str, doc: Document) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(doc);
    }

    pub fn update(&self, collection: &str, id: &DocumentId, patch: &Document) -> UpdateResult {
        let id = id.to_string();
        let target = self.collections.get_mut(collection);
        let mut docs = match target {
            Some(docs) => docs,
            None => return unmatched(),
        };

        match docs.iter_mut().find(|doc| has_id(doc, &id)) {
            Some(doc) => UpdateResult {
                acknowledged: true,
                matched_count: 1,
                modified_count: u64::from(merge_patch(doc, patch)),
            },
            None => unmatched(),
        }
    }

    pub fn delete(&self, collection: &str, id: &DocumentId) -> DeleteResult {
        let id = id.to_string();
        let deleted_count = match self.collections.get_mut(collection) {
            Some(mut docs) => {
                let before = docs.len();
                docs.retain(|doc| !has_id(doc, &id));
                (before - docs.len()) as u64
            }
            None => 0,
        };

        DeleteResult {
            acknowledged: true,
            deleted_count,
        }
    }
}

fn unmatched() -> UpdateResult {
    UpdateResult {
        acknowledged: true,
        matched_count: 0,
        modified_count: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::with_identity;
    use serde_json::json;

    fn user(email: &str) -> UserRecord {
        UserRecord {
            name: "Test".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
        }
    }

    fn stored(fields: serde_json::Value) -> (DocumentId, Document) {
        let id = DocumentId::generate();
        let body = fields.as_object().cloned().unwrap();
        (id, with_identity(body, id))
    }

    #[test]
    fn test_create_user_rejects_duplicate_email() {
        let store = MemoryStore::new();
        store.create_user(&user("a@example.com")).unwrap();

        let err = store.create_user(&user("a@example.com")).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Exact match only
        store.create_user(&user("A@example.com")).unwrap();
        assert_eq!(store.users.len(), 2);
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let store = MemoryStore::new();
        assert!(store.list("supplies").is_empty());

        let (_, first) = stored(json!({"title": "first"}));
        let (_, second) = stored(json!({"title": "second"}));
        store.insert("supplies", first);
        store.insert("supplies", second);

        let titles: Vec<_> = store
            .list("supplies")
            .into_iter()
            .map(|doc| doc["title"].clone())
            .collect();
        assert_eq!(titles, vec![json!("first"), json!("second")]);
        assert!(store.list("comment").is_empty());
    }

    #[test]
    fn test_update_and_delete_report_counts() {
        let store = MemoryStore::new();
        let (id, doc) = stored(json!({"title": "Rice", "quantity": 1}));
        store.insert("supplies", doc);

        let patch = json!({"quantity": 2}).as_object().cloned().unwrap();
        let result = store.update("supplies", &id, &patch);
        assert_eq!((result.matched_count, result.modified_count), (1, 1));

        let again = store.update("supplies", &id, &patch);
        assert_eq!((again.matched_count, again.modified_count), (1, 0));

        let missing = store.update("supplies", &DocumentId::generate(), &patch);
        assert!(missing.acknowledged);
        assert_eq!(missing.matched_count, 0);

        assert_eq!(store.delete("supplies", &id).deleted_count, 1);
        assert_eq!(store.delete("supplies", &id).deleted_count, 0);
        assert!(store.get("supplies", &id).is_none());
    }
}
