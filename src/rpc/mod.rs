//! RPC transport
//!
//! A single JSON-RPC 2.0 endpoint (`POST /rpc`) carries every operation;
//! `GET /health` probes the process and its database. Method params are
//! typed (`envelope`), card info reads go through a short TTL cache
//! (`cache`), and the mock card route exists only behind the `mock-api`
//! feature.

pub mod cache;
pub mod envelope;
pub mod handlers;
pub mod state;

#[cfg(feature = "mock-api")]
pub mod mock;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use state::AppState;

/// Build the service router
pub fn build_router(state: Arc<AppState>) -> Router {
    let app = Router::new()
        .route("/rpc", post(handlers::rpc_endpoint))
        .route("/health", get(handlers::health_check));

    // [SECURITY] Mock API routes - only compiled when 'mock-api' feature is enabled.
    // Production builds MUST be compiled with `--no-default-features` to exclude this.
    #[cfg(feature = "mock-api")]
    let app = app.nest(
        "/internal/mock",
        Router::new().route("/card", post(mock::mock_upsert_card)),
    );

    app.with_state(state)
}

/// Start the RPC server; serves until the process exits
pub async fn run_server(config: &GatewayConfig, state: Arc<AppState>) {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("❌ FATAL: Failed to bind to {}: {}", addr, e);
            eprintln!(
                "   Hint: Port {} may already be in use. Check with: lsof -i :{}",
                config.port, config.port
            );
            std::process::exit(1);
        }
    };

    println!("🚀 RPC gateway listening on http://{}", addr);
    println!("   JSON-RPC endpoint: POST /rpc");
    #[cfg(feature = "mock-api")]
    println!("🧪 Mock API enabled: POST /internal/mock/card");

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("❌ FATAL: Server error: {}", e);
        std::process::exit(1);
    }
}
