//! Card domain
//!
//! Registered payment instruments: validated identifiers, the MM/YY expiry
//! rule, and the registry that owns every balance mutation. Nothing outside
//! this module writes to `cards_tb`.

pub mod expiry;
pub mod models;
pub mod registry;
pub mod validate;

pub use expiry::ExpiryDate;
pub use models::{Card, CardInfo, CardStatus, mask_card_number};
pub use registry::CardRegistry;
pub use validate::{CardNumber, Phone, ValidationError};
