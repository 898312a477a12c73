// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Direct Relief API server
//!
//! User registration and login with hashed passwords and signed access
//! tokens, plus list/get/create/update/delete endpoints over the supplies,
//! testimonial, comment and volunteer collections.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::DocumentStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: DocumentStore,
}
