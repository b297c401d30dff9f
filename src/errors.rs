use std::path::PathBuf;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Top-level application error.
/// All variants carry a human-readable message for display/logging.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Catalog errors ───────────────────────────────────────────────────────
    #[error("Failed to read catalog {}: {source}", .path.display())]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed catalog {}: {source}", .path.display())]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // ── Inference backend errors ─────────────────────────────────────────────
    #[error("Inference backend unavailable at {host}: {source}")]
    BackendUnavailable {
        host: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Inference stream failed: {0}")]
    BackendStream(#[source] reqwest::Error),

    // ── Request errors ───────────────────────────────────────────────────────
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] JsonRejection),

    // ── System errors ────────────────────────────────────────────────────────
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn backend_unavailable(host: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::BackendUnavailable { host: host.into(), source }
    }

    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, AppError::BackendUnavailable { .. })
    }
}

/// Failures that happen before a stream starts are reported as one JSON
/// object rather than a transport-level error.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidRequest(rejection) => rejection.status(),
            AppError::BackendUnavailable { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({ "error": format!("An error occurred: {self}") });
        (status, Json(body)).into_response()
    }
}
