// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.
//!
//! Successful responses carry `"success": true`; failures are rendered by
//! [`AppError`](crate::error::AppError) with `"success": false`.

pub mod auth;
pub mod resources;

use crate::middleware::auth::require_auth;
use crate::AppState;
use axum::http::{header, HeaderValue, Method};
use axum::{middleware, routing::get, Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Success envelope carrying a human-readable message.
#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Success envelope carrying a result payload.
#[derive(Serialize)]
pub struct ResultResponse<T> {
    pub success: bool,
    pub result: T,
}

impl<T> ResultResponse<T> {
    pub fn new(result: T) -> Json<Self> {
        Json(Self {
            success: true,
            result,
        })
    }
}

#[derive(Serialize)]
pub struct LivenessResponse {
    pub message: String,
    pub timestamp: String,
}

/// Liveness check
async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        message: "Server is running smoothly".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer - a single trusted front-end origin
    let frontend_url = state.config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _request_parts: &axum::http::request::Parts| {
                origin.as_bytes() == frontend_url.as_bytes()
            },
        ))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/", get(liveness))
        .merge(auth::routes())
        .merge(resources::routes());

    // Protected routes (auth required)
    let protected_routes = auth::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
