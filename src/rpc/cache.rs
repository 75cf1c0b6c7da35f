//! TTL cache for `card.info` lookups
//!
//! Uses the `cached` crate for automatic expiration. Only successful
//! lookups are cached (`result = true`), so a card registered moments after
//! a miss is visible immediately.

use cached::proc_macro::cached;
use std::sync::Arc;

use crate::card::{CardInfo, CardRegistry};
use crate::transfer::TransferError;

/// Freshness window for cached card info in seconds
pub const TTL_SECONDS: u64 = 30;

/// Look up a card by number + expiry with caching.
///
/// The balance shown may lag a confirmed transfer by up to TTL_SECONDS.
#[cached(
    time = 30,
    key = "String",
    convert = r#"{ format!("{}_{}", card_number, expire) }"#,
    result = true
)]
pub async fn load_card_cached(
    registry: Arc<CardRegistry>,
    card_number: String,
    expire: String,
) -> Result<CardInfo, TransferError> {
    tracing::debug!("[cache] Loading card info from database");
    let card = registry
        .get(&card_number, &expire)
        .await?
        .ok_or(TransferError::CardNotFound)?;
    Ok(card.info())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_constant() {
        assert_eq!(TTL_SECONDS, 30);
    }
}
