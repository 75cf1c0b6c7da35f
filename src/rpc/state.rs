use std::sync::Arc;

use crate::card::CardRegistry;
use crate::db::Database;
use crate::transfer::TransferEngine;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// Transfer engine (owns the state machine)
    pub engine: Arc<TransferEngine>,
    /// Card registry, shared with the engine
    pub registry: Arc<CardRegistry>,
    /// Connection handle for health checks
    pub db: Arc<Database>,
}

impl AppState {
    pub fn new(
        engine: Arc<TransferEngine>,
        registry: Arc<CardRegistry>,
        db: Arc<Database>,
    ) -> Self {
        Self {
            engine,
            registry,
            db,
        }
    }
}
