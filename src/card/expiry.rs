//! MM/YY card expiry
//!
//! A card is valid through the last instant of its expiry month: `11/25`
//! works on 2025-11-30 and is refused from 2025-12-01.

use std::fmt;

use chrono::{DateTime, Datelike, Utc};

use super::validate::ValidationError;

/// Parsed `MM/YY` expiry. Two-digit years map into 20xx.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryDate {
    month: u32,
    year: i32,
}

impl ExpiryDate {
    /// Parse `MM/YY` with a zero-padded month in 01..=12.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        let invalid = || ValidationError::InvalidFormat {
            field: "expiry",
            value: raw.to_string(),
            expected: "MM/YY",
        };

        let (mm, yy) = raw.split_once('/').ok_or_else(invalid)?;
        if mm.len() != 2 || yy.len() != 2 {
            return Err(invalid());
        }
        let month: u32 = mm.parse().map_err(|_| invalid())?;
        let year: i32 = yy.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }

        Ok(Self {
            month,
            year: year + 2000,
        })
    }

    /// Expired means `now` has entered the month after the expiry month.
    /// Comparing (year, month) pairs gives end-of-month validity without
    /// constructing any calendar boundary.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        (now.year(), now.month()) > (self.year, self.month)
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }
}

impl fmt::Display for ExpiryDate {
    /// Canonical `MM/YY` form
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.year % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn parses_well_formed_values() {
        let e = ExpiryDate::parse("11/25").unwrap();
        assert_eq!(e.month(), 11);
        assert_eq!(e.year(), 2025);

        let e = ExpiryDate::parse("01/30").unwrap();
        assert_eq!(e.month(), 1);
        assert_eq!(e.year(), 2030);
        assert_eq!(e.to_string(), "01/30");
    }

    #[test]
    fn rejects_malformed_values() {
        for bad in ["", "1125", "13/25", "00/25", "1/25", "11/2025", "aa/bb", "11-25"] {
            assert!(ExpiryDate::parse(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn valid_through_end_of_expiry_month() {
        let e = ExpiryDate::parse("11/25").unwrap();
        assert!(!e.is_expired_at(at(2025, 11, 30)));
        assert!(e.is_expired_at(at(2025, 12, 1)));
    }

    #[test]
    fn december_expiry_rolls_into_next_year() {
        let e = ExpiryDate::parse("12/25").unwrap();
        assert!(!e.is_expired_at(at(2025, 12, 31)));
        assert!(e.is_expired_at(at(2026, 1, 1)));
    }

    #[test]
    fn clearly_past_and_future_dates() {
        let e = ExpiryDate::parse("11/25").unwrap();
        assert!(!e.is_expired_at(at(2024, 6, 15)));
        assert!(e.is_expired_at(at(2026, 6, 15)));
    }
}
