// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration, login and token introspection routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::routes::{MessageResponse, ResultResponse};
use crate::services::AccountService;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

/// Routes that require a valid access token; the layer is applied in routes/mod.rs.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/auth/me", get(me))
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    name: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub name: String,
    pub email: String,
}

/// Register a new user. No token is issued here.
async fn register(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let Json(req) = payload?;

    AccountService::new(&state.db, &state.config)
        .register(&req.name, &req.email, req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// Exchange email and password for an access token.
async fn login(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let Json(req) = payload?;

    let token = AccountService::new(&state.db, &state.config)
        .login(&req.email, req.password)
        .await?;

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
    }))
}

/// Who the presented access token belongs to.
async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ResultResponse<ProfileResponse>>> {
    let record = AccountService::new(&state.db, &state.config)
        .profile(&user.email)
        .await?;

    Ok(ResultResponse::new(ProfileResponse {
        name: record.name,
        email: record.email,
    }))
}
