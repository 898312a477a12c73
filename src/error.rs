// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Every failure leaves the server as the error arm of the response envelope:
//! `{"success": false, "error": "<kind>", "message": "<text>"}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Message shared by every failed login, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

const GENERIC_FAILURE: &str = "Something went wrong";

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Conflict(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Machine-readable kind reported in the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Conflict(_) => "conflict",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::Unauthorized => "unauthorized",
            AppError::NotFound(_) => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::Database(_) => "database_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Conflict(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Conflict(msg) => msg.clone(),
            AppError::InvalidCredentials => INVALID_CREDENTIALS.to_string(),
            AppError::Unauthorized | AppError::NotFound(_) | AppError::BadRequest(_) => {
                self.to_string()
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                GENERIC_FAILURE.to_string()
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                GENERIC_FAILURE.to_string()
            }
        };

        let body = ErrorResponse {
            success: false,
            error: self.kind(),
            message,
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
