//! Error types for the item gateway.
//!
//! Every failure that crosses the HTTP boundary is an [`ApiError`]; handlers
//! map backend errors into it locally so nothing leaves unmapped. The client
//! always receives a JSON object with a single human-readable `message`
//! field; backend detail is logged server-side only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Errors returned by the HTTP API.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Required login fields are missing or empty.
    #[error("Username and password are required")]
    MissingCredentials,

    /// Supplied credentials do not match the configured pair.
    #[error("Invalid login data")]
    InvalidCredentials,

    /// Protected route called without an Authorization header.
    #[error("No token available")]
    MissingAuthHeader,

    /// Authorization header present but the token segment is empty.
    #[error("Missing token")]
    MissingToken,

    /// Token failed signature verification or has expired.
    #[error("Token invalid or expired")]
    InvalidToken,

    /// No row matched the requested item identifier.
    #[error("No entry found")]
    ItemNotFound,

    /// Unexpected backend failure. The detail never reaches the client.
    #[error("Internal server error")]
    Internal { detail: String },
}

impl ApiError {
    /// Wrap a backend error, keeping its detail for server-side logs only.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        ApiError::Internal {
            detail: err.to_string(),
        }
    }

    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingCredentials => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::MissingAuthHeader => StatusCode::UNAUTHORIZED,
            ApiError::MissingToken => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken => StatusCode::FORBIDDEN,
            ApiError::ItemNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short classification used for audit log entries.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::MissingCredentials => "bad_request",
            ApiError::InvalidCredentials => "unauthorized",
            ApiError::MissingAuthHeader | ApiError::MissingToken => "unauthenticated",
            ApiError::InvalidToken => "forbidden",
            ApiError::ItemNotFound => "not_found",
            ApiError::Internal { .. } => "internal",
        }
    }
}

/// JSON error body returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        // Log based on severity. 404s are common and expected, keep them at
        // debug; other client errors at warn; server errors at error with
        // the backend detail that is withheld from the client.
        if status.is_server_error() {
            let detail = match &self {
                ApiError::Internal { detail } => detail.as_str(),
                _ => "",
            };
            error!(
                kind = self.kind(),
                status = status.as_u16(),
                detail = detail,
                "Server error: {}",
                message
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                kind = self.kind(),
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                kind = self.kind(),
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        (status, Json(ErrorBody { message })).into_response()
    }
}

// =============================================================================
// Tests
// =============================================================================
