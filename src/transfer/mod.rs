//! Card-to-card transfers
//!
//! OTP-gated transfer state machine persisted in PostgreSQL.
//!
//! # State Machine
//!
//! ```text
//! created → confirmed → cancelled
//! ```
//!
//! `confirmed` and `cancelled` are terminal; `cancelled` is only reachable
//! from `confirmed` (a `created` transfer never moved funds, so there is
//! nothing to reverse).
//!
//! # Safety Invariants
//!
//! 1. **Idempotent create**: `ext_id` is unique; a duplicate create fails
//!    before any side effect.
//! 2. **Bounded retry**: three wrong codes lock the transfer permanently.
//! 3. **Atomic movement**: debit, credit and state flip commit together or
//!    not at all; the debit re-checks sufficiency under the row lock.
//! 4. **Frozen conversion**: the receiving amount is computed at create;
//!    confirm and cancel move exactly those amounts, never a fresh rate.

pub mod engine;
pub mod error;
pub mod models;
pub mod state;
pub mod store;

mod integration_tests;

pub use engine::{MAX_CONFIRM_ATTEMPTS, TransferEngine};
pub use error::TransferError;
pub use models::{CreateTransfer, NewTransfer, Transfer, TransferSummary};
pub use state::TransferState;
pub use store::TransferStore;
