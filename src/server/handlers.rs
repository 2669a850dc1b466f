//! HTTP request handlers for the item gateway.
//!
//! # Endpoints
//!
//! - `GET /` - Liveness message (public)
//! - `POST /api/auth/login` - Issue a bearer token (public)
//! - `GET /api/items/{id}` - Item value lookup (protected)

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::audit::{AuditHandle, Severity};
use crate::error::ApiError;
use crate::store::ItemStore;

use super::auth::{CallerAddr, Claims, TokenAuth};

// =============================================================================
// Application State
// =============================================================================

/// The single configured credential pair the login endpoint accepts.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Exact-match comparison, case-sensitive, no hashing.
    fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

/// Shared application state passed to all handlers.
pub struct AppState<S: ItemStore> {
    /// Read-only access to the item view.
    pub store: Arc<S>,

    /// The configured credential pair.
    pub credentials: Credentials,

    /// Token issuer/verifier.
    pub tokens: TokenAuth,

    /// Audit log sender.
    pub audit: AuditHandle,
}

impl<S: ItemStore> AppState<S> {
    pub fn new(store: S, credentials: Credentials, tokens: TokenAuth, audit: AuditHandle) -> Self {
        Self {
            store: Arc::new(store),
            credentials,
            tokens,
            audit,
        }
    }
}

impl<S: ItemStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            credentials: self.credentials.clone(),
            tokens: self.tokens.clone(),
            audit: self.audit.clone(),
        }
    }
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Login request body. Fields are optional at the serde level so that a
/// missing field produces the API's own 400 response instead of a
/// deserialization rejection.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Signed bearer token, 1-hour validity.
    pub token: String,
}

/// Successful item lookup response.
#[derive(Debug, Serialize)]
pub struct ItemResponse {
    /// Stored value for the requested item.
    #[serde(rename = "itemValue")]
    pub item_value: f64,
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle liveness requests.
///
/// # Endpoint
///
/// `GET /`
///
/// # Response
///
/// `200 OK` with a plain-text liveness message.
pub async fn root_handler() -> &'static str {
    "API is running"
}

/// Handle login requests.
///
/// # Endpoint
///
/// `POST /api/auth/login`
///
/// # Request Body
///
/// `{"username": "...", "password": "..."}` - both required, non-empty.
///
/// # Response
///
/// - `200 OK`: `{"token": "..."}` signed bearer token, 1-hour validity
/// - `400 Bad Request`: missing or empty fields
/// - `401 Unauthorized`: credentials do not match the configured pair
/// - `500 Internal Server Error`: backend failure
///
/// Every attempt is recorded to the audit log with the caller's address and
/// outcome. A store liveness ping runs before issuance; its result is never
/// used for authorization.
pub async fn login_handler<S: ItemStore>(
    State(state): State<AppState<S>>,
    caller: CallerAddr,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let audit = &state.audit;

    let (username, password) = match body {
        Ok(Json(LoginRequest {
            username: Some(username),
            password: Some(password),
        })) if !username.is_empty() && !password.is_empty() => (username, password),
        _ => {
            audit.record_with(
                "Login rejected: missing username or password",
                "auth",
                "login",
                Severity::Warn,
                caller.as_str(),
            );
            return Err(ApiError::MissingCredentials);
        }
    };

    // Liveness check against the backend; authorization happens against the
    // configured credential pair below, not against this query's result.
    if let Err(e) = state.store.ping().await {
        audit.record_with(
            format!("Login failed: store unreachable: {e}"),
            "auth",
            "login",
            Severity::Error,
            caller.as_str(),
        );
        return Err(ApiError::internal(e));
    }

    if !state.credentials.matches(&username, &password) {
        audit.record_with(
            format!("Login rejected for '{username}': invalid credentials"),
            "auth",
            "login",
            Severity::Warn,
            caller.as_str(),
        );
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.tokens.issue(&username)?;

    audit.record_with(
        format!("Login succeeded for '{username}'"),
        "auth",
        "login",
        Severity::Info,
        caller.as_str(),
    );

    Ok(Json(LoginResponse { token }))
}

/// Handle item lookup requests.
///
/// # Endpoint
///
/// `GET /api/items/{id}` (requires a valid bearer token)
///
/// # Path Parameters
///
/// - `id`: Item identifier, treated as an opaque key and always passed to
///   the store as a bound query parameter.
///
/// # Response
///
/// - `200 OK`: `{"itemValue": <number>}`
/// - `401 Unauthorized`: missing or empty bearer token
/// - `403 Forbidden`: invalid or expired token
/// - `404 Not Found`: no row matches the identifier
/// - `500 Internal Server Error`: backend failure
pub async fn item_handler<S: ItemStore>(
    State(state): State<AppState<S>>,
    caller: CallerAddr,
    Extension(claims): Extension<Claims>,
    Path(item_id): Path<String>,
) -> Result<Json<ItemResponse>, ApiError> {
    let audit = &state.audit;

    match state.store.item_value(&item_id).await {
        Ok(Some(value)) => {
            audit.record_with(
                format!("Item '{item_id}' -> {value} for '{}'", claims.username),
                "items",
                "lookup",
                Severity::Info,
                caller.as_str(),
            );
            Ok(Json(ItemResponse { item_value: value }))
        }
        Ok(None) => {
            audit.record_with(
                format!("No entry found for item '{item_id}'"),
                "items",
                "lookup",
                Severity::Warn,
                caller.as_str(),
            );
            Err(ApiError::ItemNotFound)
        }
        Err(e) => {
            audit.record_with(
                format!("Lookup failed for item '{item_id}': {e}"),
                "items",
                "lookup",
                Severity::Error,
                caller.as_str(),
            );
            Err(ApiError::internal(e))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
