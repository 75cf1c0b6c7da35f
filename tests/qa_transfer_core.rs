//! Independent QA pass over the money-critical seams: expiry boundaries,
//! conversion rounding, OTP sealing and card masking. No database needed.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use cardpay::card::{CardNumber, ExpiryDate, mask_card_number};
use cardpay::config::RatesConfig;
use cardpay::fx::{CurrencyConverter, StaticRateFeed};
use cardpay::otp::{CodeDelivery, DeliveryError, OtpIssuer};
use cardpay::transfer::TransferError;

/// Delivery sink that drops everything
struct NullDelivery;

#[async_trait::async_trait]
impl CodeDelivery for NullDelivery {
    async fn deliver(&self, _text: &str) -> Result<(), DeliveryError> {
        Ok(())
    }
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Converter with UZS settlement and a fixed USD rate of 4
fn converter_usd_at_4() -> CurrencyConverter {
    let feed = StaticRateFeed::new().with_rate("840", "USD", dec("4"));
    CurrencyConverter::new(Arc::new(feed), &RatesConfig::default())
}

// ============================================================
// EXPIRY: month granularity, inclusive of the named month
// ============================================================

#[test]
fn qa_tc_expiry_boundary_is_month_granular() {
    // Setup: "now" is mid-December 2025
    let now = Utc.with_ymd_and_hms(2025, 12, 15, 12, 0, 0).unwrap();

    // A card expiring 11/25 went stale on Dec 1; 12/25 is good through Dec 31
    let last_month = ExpiryDate::parse("11/25").unwrap();
    let this_month = ExpiryDate::parse("12/25").unwrap();
    let next_year = ExpiryDate::parse("01/26").unwrap();

    assert!(
        last_month.is_expired_at(now),
        "card from the previous month must be expired"
    );
    assert!(
        !this_month.is_expired_at(now),
        "card expiring this month is valid through the whole month"
    );
    assert!(!next_year.is_expired_at(now));
}

#[test]
fn qa_tc_expiry_rejects_malformed_input() {
    for raw in ["13/25", "00/25", "1225", "12-25", "12/2025", ""] {
        assert!(ExpiryDate::parse(raw).is_err(), "should reject {:?}", raw);
    }
}

// ============================================================
// CONVERSION: settlement passthrough and half-to-even rounding
// ============================================================

#[tokio::test]
async fn qa_tc_settlement_currency_passes_through() {
    let converter = converter_usd_at_4();

    // "860" is the settlement code itself: no feed lookup, rate pinned to 1
    let conv = converter.convert(dec("500.00"), "860").await.unwrap();
    assert_eq!(conv.amount, dec("500.00"));
    assert_eq!(conv.rate, Decimal::ONE);
    assert_eq!(conv.currency, "UZS");
}

#[tokio::test]
async fn qa_tc_conversion_rounds_half_to_even() {
    let converter = converter_usd_at_4();

    // 0.10 / 4 = 0.025 -> ties to the even digit, 0.02
    let down = converter.convert(dec("0.10"), "840").await.unwrap();
    assert_eq!(down.amount, dec("0.02"), "0.025 must round down to even");

    // 0.30 / 4 = 0.075 -> ties to the even digit, 0.08
    let up = converter.convert(dec("0.30"), "840").await.unwrap();
    assert_eq!(up.amount, dec("0.08"), "0.075 must round up to even");

    assert_eq!(up.rate, dec("4"));
    assert_eq!(up.currency, "USD");
}

#[tokio::test]
async fn qa_tc_unknown_currency_is_rate_unavailable() {
    let converter = converter_usd_at_4();

    let err = converter.convert(dec("10"), "978").await.unwrap_err();
    assert!(matches!(err, TransferError::RateUnavailable(_)));
}

// ============================================================
// OTP: sealed form verifies the original code and nothing else
// ============================================================

#[test]
fn qa_tc_sealed_code_verifies_only_itself() {
    let issuer = OtpIssuer::new(Arc::new(NullDelivery));

    let code = issuer.issue();
    let sealed = issuer.seal(&code).unwrap();

    // The stored form is a PHC string, not the code
    assert!(sealed.starts_with("$argon2"));
    assert!(!sealed.contains(&code));

    assert!(issuer.verify(&code, &sealed));
    assert!(!issuer.verify("000000", &sealed), "000000 is never issued");
    assert!(!issuer.verify("", &sealed));
}

#[test]
fn qa_tc_sealing_is_salted() {
    let issuer = OtpIssuer::new(Arc::new(NullDelivery));

    // Same code sealed twice must not produce the same ciphertext
    let a = issuer.seal("123456").unwrap();
    let b = issuer.seal("123456").unwrap();
    assert_ne!(a, b);
    assert!(issuer.verify("123456", &a));
    assert!(issuer.verify("123456", &b));
}

// ============================================================
// MASKING: first 4 + last 4, everywhere a card number surfaces
// ============================================================

#[test]
fn qa_tc_card_number_masks_consistently() {
    let number = CardNumber::new("8600123412341098").unwrap();

    assert_eq!(number.masked(), "8600****1098");
    assert_eq!(format!("{}", number), "8600****1098");
    assert_eq!(mask_card_number("8600123412341098"), "8600****1098");

    // Display must never leak the middle digits
    assert!(!format!("{}", number).contains("1234123"));
}
