//! Exchange-rate feed
//!
//! Central-bank style endpoint publishing a JSON list of currency entries,
//! looked up by numeric currency code.

use anyhow::Context;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::RatesConfig;
use crate::transfer::error::TransferError;

/// One published entry. Rates arrive as strings and are parsed exactly.
#[derive(Debug, Clone, Deserialize)]
pub struct RateEntry {
    #[serde(rename = "Ccy")]
    pub ccy: String,
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Rate")]
    pub rate: String,
}

/// A resolved rate for one currency code
#[derive(Debug, Clone, PartialEq)]
pub struct RateQuote {
    /// Display label ("USD", "EUR", ...)
    pub ccy: String,
    /// Units of the settlement currency per one unit of this currency
    pub rate: Decimal,
}

/// Rate lookup seam
#[async_trait]
pub trait RateFeed: Send + Sync {
    /// Quote for a numeric currency code; None when the feed has no match
    async fn rate_for(&self, code: &str) -> Result<Option<RateQuote>, TransferError>;
}

/// Production feed over HTTP
pub struct HttpRateFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpRateFeed {
    pub fn new(config: &RatesConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to create rate feed HTTP client")?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl RateFeed for HttpRateFeed {
    async fn rate_for(&self, code: &str) -> Result<Option<RateQuote>, TransferError> {
        // Feed outage is an internal failure, not a rate miss
        let entries: Vec<RateEntry> = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| TransferError::Internal(format!("rate feed request failed: {}", e)))?
            .json()
            .await
            .map_err(|e| TransferError::Internal(format!("rate feed returned bad JSON: {}", e)))?;

        for entry in entries {
            if entry.code == code {
                let rate = entry.rate.trim().parse::<Decimal>().map_err(|_| {
                    TransferError::Internal(format!(
                        "rate feed published unparseable rate for code {}",
                        code
                    ))
                })?;
                return Ok(Some(RateQuote {
                    ccy: entry.ccy,
                    rate,
                }));
            }
        }

        Ok(None)
    }
}

/// Fixed in-memory rates for tests and offline runs
#[derive(Default)]
pub struct StaticRateFeed {
    rates: HashMap<String, RateQuote>,
}

impl StaticRateFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, code: &str, ccy: &str, rate: Decimal) -> Self {
        self.rates.insert(
            code.to_string(),
            RateQuote {
                ccy: ccy.to_string(),
                rate,
            },
        );
        self
    }
}

#[async_trait]
impl RateFeed for StaticRateFeed {
    async fn rate_for(&self, code: &str) -> Result<Option<RateQuote>, TransferError> {
        Ok(self.rates.get(code).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_entries_deserialize_from_published_shape() {
        let json = r#"[
            {"id": 69, "Code": "840", "Ccy": "USD", "Rate": "12104.25", "Date": "25.08.2026"},
            {"id": 70, "Code": "978", "Ccy": "EUR", "Rate": "13210.50", "Date": "25.08.2026"}
        ]"#;
        let entries: Vec<RateEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].code, "840");
        assert_eq!(entries[0].ccy, "USD");
        assert_eq!(entries[0].rate, "12104.25");
    }

    #[tokio::test]
    async fn static_feed_returns_configured_quotes() {
        let feed = StaticRateFeed::new().with_rate("840", "USD", Decimal::new(1210425, 2));
        let quote = feed.rate_for("840").await.unwrap().unwrap();
        assert_eq!(quote.ccy, "USD");
        assert_eq!(quote.rate, Decimal::new(1210425, 2));
        assert!(feed.rate_for("978").await.unwrap().is_none());
    }
}
