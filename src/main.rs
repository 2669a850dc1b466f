//! Item Gateway - bearer-token login and item value lookup.
//!
//! This binary loads configuration, connects to the database, starts the
//! audit log writer, and serves the HTTP API.

use std::net::SocketAddr;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use item_gateway::{
    audit,
    audit::Severity,
    config::Config,
    create_router,
    server::{AppState, Credentials, TokenAuth},
    store::PgItemStore,
    RouterConfig,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Configuration:");
    info!("  Database: {}@{}:{}/{}", config.db_user, config.db_host, config.db_port, config.db_name);
    info!("  Schema: {}", config.db_schema);
    info!("  Audit log directory: {}", config.log_dir);

    // Start the audit log writer
    let (audit_handle, _audit_task) = audit::spawn(&config.log_dir);

    // Connect to the database
    info!("");
    info!("Connecting to database...");
    let store = match PgItemStore::connect(&config).await {
        Ok(store) => {
            info!("  Connected successfully");
            audit_handle.record("Database connection established", "db", "initialize");
            store
        }
        Err(e) => {
            error!("  Failed to connect to database: {}", e);
            error!("");
            error!("  Please check:");
            error!("    - The DB_* settings point at a reachable Postgres instance");
            error!("    - The user '{}' can access database '{}'", config.db_user, config.db_name);
            return ExitCode::FAILURE;
        }
    };

    // Build application state and router
    let credentials = Credentials::new(&config.db_user, &config.db_password);
    let tokens = TokenAuth::new(&config.jwt_secret);
    let state = AppState::new(store, credentials, tokens, audit_handle.clone());

    let router_config = RouterConfig::new().with_tracing(!config.no_tracing);
    let router = create_router(state, router_config);

    // Bind and serve
    let addr = config.bind_address();

    info!("");
    info!("Server listening on: http://{}", addr);
    info!("  Try: curl http://{}/", addr);
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    audit_handle.record_with(
        format!("Server runs on port {}", config.port),
        "server",
        "listen",
        Severity::Info,
        "",
    );

    if let Err(e) = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "item_gateway=debug,tower_http=debug"
    } else {
        "item_gateway=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
