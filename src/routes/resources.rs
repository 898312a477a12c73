// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Resource collection routes: supplies, testimonials, comments, volunteers.
//!
//! Bodies are stored as sent; nothing here validates their shape beyond
//! requiring a JSON object.

use crate::db::collections;
use crate::error::{AppError, Result};
use crate::models::{DeleteResult, Document, DocumentId, InsertResult, UpdateResult};
use crate::routes::{MessageResponse, ResultResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

type JsonBody = std::result::Result<Json<Document>, JsonRejection>;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/supplies",
            get(|state: State<Arc<AppState>>| list(state, collections::SUPPLIES))
                .post(|state: State<Arc<AppState>>, body: JsonBody| {
                    create(state, collections::SUPPLIES, body)
                }),
        )
        .route(
            "/api/supplies/{id}",
            get(get_supply).put(update_supply).delete(delete_supply),
        )
        // Update and delete have always been served without the /api prefix.
        .route("/supplies/{id}", put(update_supply).delete(delete_supply))
        .route(
            "/api/testimonial",
            get(|state: State<Arc<AppState>>| list(state, collections::TESTIMONIALS))
                .post(|state: State<Arc<AppState>>, body: JsonBody| {
                    create(state, collections::TESTIMONIALS, body)
                }),
        )
        .route(
            "/api/comment",
            get(|state: State<Arc<AppState>>| list(state, collections::COMMENTS))
                .post(|state: State<Arc<AppState>>, body: JsonBody| {
                    create(state, collections::COMMENTS, body)
                }),
        )
        .route(
            "/api/volunteer",
            get(|state: State<Arc<AppState>>| list(state, collections::VOLUNTEERS))
                .post(register_volunteer),
        )
}

fn parse_id(raw: &str) -> Result<DocumentId> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("Document {} not found", raw)))
}

// ─── Generic collection operations ───────────────────────────

/// List every document; an empty collection is a successful empty list.
async fn list(
    State(state): State<Arc<AppState>>,
    collection: &'static str,
) -> Result<Json<ResultResponse<Vec<Document>>>> {
    let docs = state.db.list(collection).await?;
    Ok(ResultResponse::new(docs))
}

async fn create(
    State(state): State<Arc<AppState>>,
    collection: &'static str,
    body: JsonBody,
) -> Result<Json<ResultResponse<InsertResult>>> {
    let Json(doc) = body?;
    let result = state.db.insert(collection, doc).await?;
    Ok(ResultResponse::new(result))
}

// ─── Supplies ────────────────────────────────────────────────

async fn get_supply(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ResultResponse<Document>>> {
    let doc_id = parse_id(&id)?;
    let doc = state
        .db
        .get(collections::SUPPLIES, &doc_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {} not found", id)))?;
    Ok(ResultResponse::new(doc))
}

/// Merge-patch a supply. Success means the store acknowledged the write,
/// whether or not a document matched.
async fn update_supply(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: JsonBody,
) -> Result<Json<ResultResponse<UpdateResult>>> {
    let doc_id = parse_id(&id)?;
    let Json(patch) = body?;
    let result = state.db.update(collections::SUPPLIES, &doc_id, patch).await?;
    Ok(ResultResponse::new(result))
}

async fn delete_supply(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ResultResponse<DeleteResult>>> {
    let doc_id = parse_id(&id)?;
    let result = state.db.delete(collections::SUPPLIES, &doc_id).await?;
    Ok(ResultResponse::new(result))
}

// ─── Volunteers ──────────────────────────────────────────────

/// Volunteer sign-up. Exactly these three fields are stored, whatever their
/// JSON type; a field the client leaves out is stored as `null`.
#[derive(Deserialize, Serialize)]
pub struct VolunteerSignup {
    #[serde(default)]
    pub email: Value,
    #[serde(default)]
    pub number: Value,
    #[serde(default)]
    pub location: Value,
}

async fn register_volunteer(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<VolunteerSignup>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let Json(signup) = payload?;

    let doc = match serde_json::to_value(&signup).map_err(anyhow::Error::from)? {
        Value::Object(map) => map,
        _ => Document::new(),
    };
    state.db.insert(collections::VOLUNTEERS, doc).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Volunteer registered successfully")),
    ))
}
