// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod document;
pub mod user;

pub use document::{DeleteResult, Document, DocumentId, InsertResult, UpdateResult};
pub use user::UserRecord;
