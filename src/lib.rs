//! # Item Gateway
//!
//! A minimal HTTP API gateway exposing two resources: user authentication
//! (issuing short-lived bearer tokens) and item value lookup (reading a
//! single row from a relational view).
//!
//! ## Architecture
//!
//! - [`config`] - CLI and environment configuration
//! - [`error`] - API error taxonomy and HTTP mapping
//! - [`audit`] - daily append-only audit log
//! - [`store`] - relational store seam and Postgres implementation
//! - [`server`] - Axum router, handlers, and bearer-token middleware
//!
//! ## Example
//!
//! ```rust,no_run
//! use item_gateway::{audit, AppState, Credentials, RouterConfig, TokenAuth, create_router};
//! use item_gateway::store::{ItemStore, PgItemStore};
//!
//! # async fn run(store: PgItemStore) {
//! let (audit_handle, _writer) = audit::spawn("log");
//!
//! let state = AppState::new(
//!     store,
//!     Credentials::new("svc", "correct"),
//!     TokenAuth::new("shared-secret"),
//!     audit_handle,
//! );
//!
//! let router = create_router(state, RouterConfig::new());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//! axum::serve(
//!     listener,
//!     router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
//! )
//! .await
//! .unwrap();
//! # }
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod server;
pub mod store;

pub use audit::{AuditHandle, Severity};
pub use config::Config;
pub use error::ApiError;
pub use server::{create_router, AppState, CallerAddr, Claims, Credentials, RouterConfig, TokenAuth};
pub use store::{ItemStore, PgItemStore, StoreError};
