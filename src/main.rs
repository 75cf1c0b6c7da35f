//! cardpay service binary
//!
//! ```text
//! ┌────────┐   ┌──────────┐   ┌────────────────┐   ┌───────────┐
//! │ config │──▶│ Postgres │──▶│ TransferEngine │──▶│ POST /rpc │
//! │ (YAML) │   │ (ledger) │   │ create/confirm │   │  (axum)   │
//! └────────┘   └──────────┘   │     /cancel    │   └───────────┘
//!                             └────────────────┘
//! ```
//!
//! Usage: cardpay [--env <name>] [--port <port>]

use std::sync::Arc;

use anyhow::Context;

use cardpay::card::CardRegistry;
use cardpay::config::AppConfig;
use cardpay::db::Database;
use cardpay::fx::{CurrencyConverter, HttpRateFeed};
use cardpay::otp::{CodeDelivery, OtpIssuer, TelegramDelivery};
use cardpay::report::ReportWorker;
use cardpay::rpc;
use cardpay::rpc::state::AppState;
use cardpay::transfer::{TransferEngine, TransferStore};

/// Get environment name from command line arguments (--env or -e)
fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line arguments (--port)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env).context("failed to load configuration")?;
    let _log_guard = cardpay::logging::init_logging(&app_config);

    tracing::info!("Starting cardpay (env: {})", env);

    let db = Database::connect(&app_config.postgres_url)
        .await
        .context("failed to connect to PostgreSQL")?;
    db.ensure_schema()
        .await
        .context("failed to ensure ledger schema")?;
    let db = Arc::new(db);
    println!("✅ PostgreSQL connected, ledger schema ensured");

    // External collaborators: code delivery and the rate feed
    let delivery: Arc<dyn CodeDelivery> =
        Arc::new(TelegramDelivery::new(&app_config.notify).context("notify config invalid")?);
    let feed = Arc::new(HttpRateFeed::new(&app_config.rates).context("rates config invalid")?);

    let registry = Arc::new(CardRegistry::new(db.pool().clone()));
    let engine = Arc::new(TransferEngine::new(
        TransferStore::new(db.pool().clone()),
        registry.clone(),
        CurrencyConverter::new(feed, &app_config.rates),
        OtpIssuer::new(delivery.clone()),
    ));

    if app_config.report.enabled {
        let worker = ReportWorker::new(engine.clone(), delivery.clone(), &app_config.report);
        tokio::spawn(async move { worker.run().await });
        println!(
            "📊 Report worker started (every {}s)",
            app_config.report.interval_secs
        );
    }

    let mut gateway_config = app_config.gateway.clone();
    if let Some(port) = get_port_override() {
        println!("📌 Port override: {}", port);
        gateway_config.port = port;
    }

    let state = Arc::new(AppState::new(engine, registry, db));
    rpc::run_server(&gateway_config, state).await;

    Ok(())
}
