// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::time::Duration;

/// Origin of the hosted front-end, the only origin allowed by CORS by default.
pub const DEFAULT_FRONTEND_URL: &str = "https://direct-relief-client1.vercel.app";

const DEFAULT_PORT: u16 = 5000;

/// Which document store backend to open at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// The single origin allowed to make cross-origin requests
    pub frontend_url: String,
    /// Document store backend
    pub store_backend: StoreBackend,
    /// GCP project ID (Firestore backend only)
    pub gcp_project_id: String,

    // --- Secrets ---
    /// JWT signing key for access tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Lifetime of an issued access token
    pub token_ttl: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            frontend_url: "http://localhost:5173".to_string(),
            store_backend: StoreBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            token_ttl: Duration::from_secs(60 * 60),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", raw))?,
            Err(_) => DEFAULT_PORT,
        };

        let frontend_url = env::var("FRONTEND_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string());
        if axum::http::HeaderValue::from_str(&frontend_url).is_err() {
            return Err(ConfigError::Invalid("FRONTEND_URL", frontend_url));
        }

        let store_backend = match env::var("DOCUMENT_STORE") {
            Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "firestore" => StoreBackend::Firestore,
                "memory" => StoreBackend::Memory,
                _ => return Err(ConfigError::Invalid("DOCUMENT_STORE", raw)),
            },
            Err(_) => StoreBackend::Firestore,
        };

        let gcp_project_id = match (store_backend, env::var("GCP_PROJECT_ID")) {
            (_, Ok(project)) => project.trim().to_string(),
            (StoreBackend::Firestore, Err(_)) => {
                return Err(ConfigError::Missing("GCP_PROJECT_ID"))
            }
            (StoreBackend::Memory, Err(_)) => "local-dev".to_string(),
        };

        let jwt_signing_key = env::var("JWT_SECRET")
            .map_err(|_| ConfigError::Missing("JWT_SECRET"))?
            .into_bytes();
        if jwt_signing_key.is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET", String::new()));
        }

        let raw_ttl = env::var("EXPIRES_IN").map_err(|_| ConfigError::Missing("EXPIRES_IN"))?;
        let token_ttl =
            parse_duration(&raw_ttl).ok_or(ConfigError::Invalid("EXPIRES_IN", raw_ttl))?;

        Ok(Self {
            port,
            frontend_url,
            store_backend,
            gcp_project_id,
            jwt_signing_key,
            token_ttl,
        })
    }
}

/// Parse a token lifetime such as `90s`, `1.5h`, `7d` or `2 days`.
///
/// A bare number is a count of milliseconds, as node's `ms` reads a unitless
/// string. Fractional amounts are allowed; zero-length lifetimes are rejected.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(raw.len());
    let (amount, unit) = raw.split_at(split);
    let amount: f64 = amount.parse().ok()?;

    let millis_per_unit: f64 = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => 1.0,
        "s" | "sec" | "secs" | "second" | "seconds" => 1_000.0,
        "m" | "min" | "mins" | "minute" | "minutes" => 60.0 * 1_000.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 60.0 * 60.0 * 1_000.0,
        "d" | "day" | "days" => 24.0 * 60.0 * 60.0 * 1_000.0,
        "w" | "week" | "weeks" => 7.0 * 24.0 * 60.0 * 60.0 * 1_000.0,
        "y" | "yr" | "yrs" | "year" | "years" => 365.25 * 24.0 * 60.0 * 60.0 * 1_000.0,
        _ => return None,
    };

    let millis = (amount * millis_per_unit).round();
    if !millis.is_finite() || millis < 1.0 || millis > u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_millis(millis as u64))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("120"), Some(Duration::from_millis(120)));
        assert_eq!(parse_duration("3600000"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_duration("90s"), Some(Duration::from_secs(90)));
        assert_eq!(parse_duration("15m"), Some(Duration::from_secs(15 * 60)));
        assert_eq!(parse_duration("12h"), Some(Duration::from_secs(12 * 3600)));
        assert_eq!(parse_duration("7d"), Some(Duration::from_secs(7 * 86400)));
        assert_eq!(parse_duration("2 days"), Some(Duration::from_secs(2 * 86400)));
        assert_eq!(parse_duration("1w"), Some(Duration::from_secs(7 * 86400)));
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration(" 1H "), Some(Duration::from_secs(3600)));
        assert_eq!(parse_duration("1y"), Some(Duration::from_secs(31_557_600)));
    }

    #[test]
    fn test_parse_duration_fractional_amounts() {
        assert_eq!(parse_duration("1.5h"), Some(Duration::from_secs(5400)));
        assert_eq!(parse_duration("0.5d"), Some(Duration::from_secs(43200)));
        assert_eq!(parse_duration(".5s"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("2.5 days"), Some(Duration::from_secs(216_000)));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("abc"), None);
        assert_eq!(parse_duration("10 fortnights"), None);
        assert_eq!(parse_duration("-5s"), None);
        assert_eq!(parse_duration("0"), None);
        assert_eq!(parse_duration("0.0001s"), None);
        assert_eq!(parse_duration("1.2.3h"), None);
        assert_eq!(parse_duration("."), None);
    }

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("JWT_SECRET", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("EXPIRES_IN", "86400000");
        env::set_var("DOCUMENT_STORE", "memory");
        env::remove_var("PORT");
        env::remove_var("FRONTEND_URL");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.port, 5000);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.frontend_url, DEFAULT_FRONTEND_URL);
        assert_eq!(config.token_ttl, Duration::from_secs(86400));
        assert_eq!(config.jwt_signing_key, b"test_jwt_key_32_bytes_minimum!!");
    }
}
