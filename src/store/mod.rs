//! Relational store access for the item gateway.
//!
//! The gateway reads a single view owned by an external system. Access goes
//! through the [`ItemStore`] trait so handlers and tests do not depend on a
//! live Postgres instance.

mod postgres;

pub use postgres::PgItemStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the relational store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Query execution failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Could not reach or connect to the database.
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Read-only access to the item view.
///
/// The item identifier is an opaque external key; implementations must pass
/// it as a bound query parameter, never interpolate it into SQL.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Fetch the stored value for an item, or `None` if no row matches.
    async fn item_value(&self, item_id: &str) -> Result<Option<f64>, StoreError>;

    /// Cheap liveness round-trip against the backend.
    ///
    /// The login handler calls this before issuing a token; the result is
    /// never consulted for authorization.
    async fn ping(&self) -> Result<(), StoreError>;
}
