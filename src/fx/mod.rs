//! Currency conversion
//!
//! Sending amounts arrive in an arbitrary currency; card balances are held
//! in the settlement currency. Conversion happens once, at transfer
//! creation, and the result is frozen into the transfer record.

pub mod converter;
pub mod feed;

pub use converter::{Conversion, CurrencyConverter};
pub use feed::{HttpRateFeed, RateFeed, RateQuote, StaticRateFeed};
