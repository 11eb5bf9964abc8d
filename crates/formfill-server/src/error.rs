use std::path::PathBuf;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid file name: {0}")]
    InvalidFilename(String),

    #[error("File not found: {filename}")]
    NotFound {
        filename: String,
        available: Vec<String>,
    },

    #[error("Form processing failed: {stderr}")]
    PopulatorFailed { status: Option<i32>, stderr: String },

    #[error("Form processing timed out after {0}s")]
    Timeout(u64),

    #[error("cannot start populator {bin}: {source}")]
    Spawn {
        bin: PathBuf,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            ServerError::InvalidFilename(_) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            ServerError::NotFound { available, .. } => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": self.to_string(),
                    "available_files": available,
                })),
            )
                .into_response(),
            ServerError::PopulatorFailed { status, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": self.to_string(),
                    "exit_status": status,
                })),
            )
                .into_response(),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": self.to_string() })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        let bad = ServerError::InvalidFilename("../x".into()).into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let missing = ServerError::NotFound {
            filename: "a.docx".into(),
            available: vec![],
        }
        .into_response();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let failed = ServerError::PopulatorFailed {
            status: Some(2),
            stderr: "no templates".into(),
        }
        .into_response();
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn populator_failure_carries_stderr() {
        let e = ServerError::PopulatorFailed {
            status: Some(1),
            stderr: "loading record: missing form_fields".into(),
        };
        assert_eq!(
            e.to_string(),
            "Form processing failed: loading record: missing form_fields"
        );
    }
}
