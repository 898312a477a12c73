// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Schema-less resource documents and the acknowledgements returned for writes.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Field that carries the store-assigned identity inside every document.
pub const ID_FIELD: &str = "_id";

/// A resource document: arbitrary caller-supplied fields plus `_id`.
pub type Document = Map<String, Value>;

/// Store-assigned document identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generate a fresh identity for an insert.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl Serialize for DocumentId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Acknowledgement for an insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: DocumentId,
}

/// Acknowledgement for a merge-patch update.
///
/// A write to a missing document is still acknowledged, with zero counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Acknowledgement for a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Stamp a caller body with its new identity, replacing any `_id` it carried.
pub fn with_identity(mut body: Document, id: DocumentId) -> Document {
    body.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    body
}

/// Drop fields callers may not write.
pub fn sanitize_patch(mut patch: Document) -> Document {
    patch.remove(ID_FIELD);
    patch
}

/// Apply a top-level merge-patch; fields absent from `patch` are untouched.
///
/// Returns whether the document changed.
pub fn merge_patch(target: &mut Document, patch: &Document) -> bool {
    let mut changed = false;
    for (key, value) in patch {
        if target.get(key) != Some(value) {
            target.insert(key.clone(), value.clone());
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_merge_patch_leaves_unmentioned_fields() {
        let mut target = doc(json!({"title": "Rice", "quantity": 10, "category": "food"}));
        let changed = merge_patch(&mut target, &doc(json!({"quantity": 25})));

        assert!(changed);
        assert_eq!(
            Value::Object(target),
            json!({"title": "Rice", "quantity": 25, "category": "food"})
        );
    }

    #[test]
    fn test_merge_patch_same_values_is_not_a_change() {
        let mut target = doc(json!({"title": "Rice", "quantity": 10}));
        assert!(!merge_patch(&mut target, &doc(json!({"quantity": 10}))));
        assert!(!merge_patch(&mut target, &Document::new()));
    }

    #[test]
    fn test_identity_overrides_caller_id() {
        let id = DocumentId::generate();
        let stamped = with_identity(doc(json!({"_id": "mine", "x": 1})), id);
        assert_eq!(stamped[ID_FIELD], json!(id.to_string()));

        let patch = sanitize_patch(doc(json!({"_id": "other", "x": 2})));
        assert!(!patch.contains_key(ID_FIELD));
    }

    #[test]
    fn test_document_id_parsing() {
        let id = DocumentId::generate();
        assert_eq!(id.to_string().parse::<DocumentId>().unwrap(), id);
        assert!("not-an-id".parse::<DocumentId>().is_err());
        assert!("64f1c0ffee0000000000abcd".parse::<DocumentId>().is_err());
    }
}
