pub mod health;
pub mod rows;
pub mod upstream;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::services::{FetchError, SyncError};

/// Error body returned to the sheet: `{ "error": ..., "message": ... }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    message: Option<String>,
}

impl ApiError {
    pub fn bad_request(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
            message: Some(message.into()),
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Address(err) => Self::bad_request(
                "Missing 'address' parameter",
                format!("Please provide a wallet address ({err})."),
            ),
            SyncError::Fetch(FetchError::Transport { status, body }) => Self {
                status: StatusCode::BAD_GATEWAY,
                error: format!("Portfolio API returned HTTP {status}"),
                message: Some(body),
            },
            SyncError::Fetch(err) => Self {
                status: StatusCode::BAD_GATEWAY,
                error: "Portfolio API unavailable".to_string(),
                message: Some(err.to_string()),
            },
            SyncError::RemoteReported { error, message } => Self {
                status: StatusCode::BAD_GATEWAY,
                error,
                message,
            },
            SyncError::Sheet(err) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: "Sheet write failed".to_string(),
                message: Some(err.to_string()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.error,
            "message": self.message.unwrap_or_default(),
        }));
        (self.status, body).into_response()
    }
}
