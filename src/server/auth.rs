//! Bearer token authentication for the item gateway.
//!
//! Tokens are HS256 JWTs carrying `{id, username, exp}`, signed with the
//! server-held shared secret and valid for one hour. Verification is
//! stateless and all-or-nothing per request; there is no caching of verified
//! tokens and no revocation list.
//!
//! # Example
//!
//! ```rust
//! use item_gateway::server::auth::TokenAuth;
//!
//! let auth = TokenAuth::new("my-secret-key");
//! let token = auth.issue("svc").unwrap();
//! let claims = auth.verify(&token).unwrap();
//! assert_eq!(claims.username, "svc");
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Fixed subject identity encoded into every issued token.
pub const SUBJECT_ID: i64 = 2;

/// Token validity in seconds (1 hour).
pub const TOKEN_TTL_SECS: i64 = 3600;

// =============================================================================
// Claims
// =============================================================================

/// Claims carried inside an issued token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Fixed numeric subject identity.
    pub id: i64,

    /// Username supplied at login.
    pub username: String,

    /// Expiry (seconds since epoch).
    pub exp: i64,
}

// =============================================================================
// Token Authenticator
// =============================================================================

/// Issues and verifies HS256 bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenAuth {
    secret: Vec<u8>,
}

impl TokenAuth {
    /// Create an authenticator with the given shared secret.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Issue a token for a verified username, expiring in one hour.
    pub fn issue(&self, username: &str) -> Result<String, ApiError> {
        self.issue_at(username, SystemTime::now())
    }

    /// Issue a token as of a specific instant. Split out so expiry behavior
    /// is testable without sleeping.
    pub fn issue_at(&self, username: &str, now: SystemTime) -> Result<String, ApiError> {
        let issued_at = now
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ApiError::internal(format!("System clock before epoch: {e}")))?
            .as_secs() as i64;

        let claims = Claims {
            id: SUBJECT_ID,
            username: username.to_string(),
            exp: issued_at + TOKEN_TTL_SECS,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| ApiError::internal(format!("Failed to encode token: {e}")))
    }

    /// Verify a token's signature and expiry, returning its claims.
    ///
    /// Any failure (bad signature, expired, malformed) maps to
    /// [`ApiError::InvalidToken`]; the caller cannot distinguish why.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // The contract is a hard 1-hour cutoff, not "1 hour plus grace".
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| ApiError::InvalidToken)
    }
}

// =============================================================================
// Axum Middleware
// =============================================================================

/// Middleware guarding protected routes.
///
/// Reads `Authorization: Bearer <token>`; on success the decoded [`Claims`]
/// are inserted into request extensions for downstream handlers.
///
/// - Missing header: 401 "No token available"
/// - Header present but no token segment: 401 "Missing token"
/// - Invalid signature or expired: 403 "Token invalid or expired"
pub async fn auth_middleware(
    State(auth): State<TokenAuth>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or(ApiError::MissingAuthHeader)?;

    let header = header.to_str().map_err(|_| ApiError::MissingToken)?;

    // The token is the segment after the scheme. An empty or absent segment
    // is "header present but no token", a distinct message from no header.
    let token = header.split(' ').nth(1).unwrap_or("");
    if token.is_empty() {
        return Err(ApiError::MissingToken);
    }

    let claims = auth.verify(token)?;
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

// =============================================================================
// Caller Address Extractor
// =============================================================================

/// The caller's network address, for audit log entries.
///
/// Resolves the first hop of `X-Forwarded-For` when a reverse proxy set it,
/// then the connected peer's IP when the server is run with
/// `into_make_service_with_connect_info`, and an empty string otherwise
/// (e.g. in router-level tests). Extraction never fails.
#[derive(Debug, Clone)]
pub struct CallerAddr(pub String);

impl CallerAddr {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CallerAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty());

        let addr = match forwarded {
            Some(hop) => hop.to_string(),
            None => parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
                .unwrap_or_default(),
        };

        Ok(CallerAddr(addr))
    }
}

// =============================================================================
// Tests
// =============================================================================
