//! cardpay - Card-to-Card Transfer Service
//!
//! OTP-gated transfers between registered payment cards, served over a
//! JSON-RPC endpoint and backed by a PostgreSQL ledger.
//!
//! # Modules
//!
//! - [`card`] - Validated card identifiers, expiry rules, the card registry
//! - [`fx`] - Currency conversion against an external rate feed
//! - [`otp`] - One-time code issuance, sealing and delivery
//! - [`transfer`] - The transfer state machine, store and engine
//! - [`rpc`] - JSON-RPC transport (axum)
//! - [`report`] - Background ledger summary worker
//! - [`config`] - YAML configuration
//! - [`db`] - PostgreSQL pool and schema
//! - [`logging`] - tracing subscriber setup

pub mod card;
pub mod config;
pub mod db;
pub mod fx;
pub mod logging;
pub mod otp;
pub mod report;
pub mod rpc;
pub mod transfer;

// Convenient re-exports at crate root
pub use card::{Card, CardInfo, CardNumber, CardRegistry, CardStatus, ExpiryDate, Phone};
pub use transfer::{
    CreateTransfer, MAX_CONFIRM_ATTEMPTS, Transfer, TransferEngine, TransferError, TransferState,
    TransferStore, TransferSummary,
};
