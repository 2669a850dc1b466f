//! HTTP server: routes, handlers, and bearer-token authentication.

pub mod auth;
pub mod handlers;
pub mod routes;

pub use auth::{CallerAddr, Claims, TokenAuth};
pub use handlers::{AppState, Credentials};
pub use routes::{create_router, RouterConfig};
