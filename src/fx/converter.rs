//! Settlement-currency conversion

use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;

use super::feed::RateFeed;
use crate::config::RatesConfig;
use crate::transfer::error::TransferError;

/// Result of one conversion, frozen into the transfer record at create time
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// Amount in the settlement currency, two decimal places
    pub amount: Decimal,
    pub rate: Decimal,
    /// Display label of the source currency ("UZS", "USD", ...)
    pub currency: String,
}

pub struct CurrencyConverter {
    feed: Arc<dyn RateFeed>,
    settlement_code: String,
    settlement_label: String,
}

impl CurrencyConverter {
    pub fn new(feed: Arc<dyn RateFeed>, config: &RatesConfig) -> Self {
        Self {
            feed,
            settlement_code: config.settlement_code.clone(),
            settlement_label: config.settlement_label.clone(),
        }
    }

    /// Convert `amount` of `source_currency` into the settlement currency.
    ///
    /// Settlement-to-settlement passes through unchanged with rate 1.
    /// Division results round to two decimal places, half to even.
    pub async fn convert(
        &self,
        amount: Decimal,
        source_currency: &str,
    ) -> Result<Conversion, TransferError> {
        if source_currency == self.settlement_code {
            return Ok(Conversion {
                amount,
                rate: Decimal::ONE,
                currency: self.settlement_label.clone(),
            });
        }

        let quote = self
            .feed
            .rate_for(source_currency)
            .await?
            .ok_or_else(|| TransferError::RateUnavailable(source_currency.to_string()))?;

        // A zero or negative published rate is as unusable as a missing one
        if quote.rate <= Decimal::ZERO {
            return Err(TransferError::RateUnavailable(source_currency.to_string()));
        }

        let converted = (amount / quote.rate)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);

        Ok(Conversion {
            amount: converted,
            rate: quote.rate,
            currency: quote.ccy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::feed::StaticRateFeed;

    fn converter(feed: StaticRateFeed) -> CurrencyConverter {
        CurrencyConverter::new(Arc::new(feed), &RatesConfig::default())
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn settlement_currency_passes_through() {
        let c = converter(StaticRateFeed::new());
        let conv = c.convert(dec("100"), "860").await.unwrap();
        assert_eq!(conv.amount, dec("100"));
        assert_eq!(conv.rate, Decimal::ONE);
        assert_eq!(conv.currency, "UZS");
    }

    #[tokio::test]
    async fn unknown_currency_is_rate_unavailable() {
        let c = converter(StaticRateFeed::new());
        let err = c.convert(dec("100"), "999").await.unwrap_err();
        assert_eq!(err, TransferError::RateUnavailable("999".to_string()));
    }

    #[tokio::test]
    async fn divides_by_the_published_rate() {
        let feed = StaticRateFeed::new().with_rate("840", "USD", dec("12500"));
        let conv = converter(feed).convert(dec("1250000"), "840").await.unwrap();
        assert_eq!(conv.amount, dec("100.00"));
        assert_eq!(conv.rate, dec("12500"));
        assert_eq!(conv.currency, "USD");
    }

    #[tokio::test]
    async fn rounds_half_to_even() {
        let feed = StaticRateFeed::new()
            .with_rate("111", "AAA", dec("2"))
            .with_rate("222", "BBB", dec("2"));

        // 100.05 / 2 = 50.025 -> 50.02 (2 is even)
        let conv = converter(feed).convert(dec("100.05"), "111").await.unwrap();
        assert_eq!(conv.amount, dec("50.02"));
    }

    #[tokio::test]
    async fn rounds_half_up_to_even_neighbour() {
        let feed = StaticRateFeed::new().with_rate("111", "AAA", dec("2"));

        // 100.15 / 2 = 50.075 -> 50.08 (8 is even)
        let conv = converter(feed).convert(dec("100.15"), "111").await.unwrap();
        assert_eq!(conv.amount, dec("50.08"));
    }

    #[tokio::test]
    async fn repeating_division_truncates_to_two_places() {
        let feed = StaticRateFeed::new().with_rate("111", "AAA", dec("3"));
        let conv = converter(feed).convert(dec("100"), "111").await.unwrap();
        assert_eq!(conv.amount, dec("33.33"));
    }

    #[tokio::test]
    async fn zero_rate_is_unusable() {
        let feed = StaticRateFeed::new().with_rate("111", "AAA", dec("0"));
        let err = converter(feed).convert(dec("100"), "111").await.unwrap_err();
        assert_eq!(err, TransferError::RateUnavailable("111".to_string()));
    }
}
