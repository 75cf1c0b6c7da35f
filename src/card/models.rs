//! Card record and its masked public view

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Phone value meaning "no SMS channel on file". Inherited from the upstream
/// card-import pipeline, which writes the literal string instead of NULL.
pub const PHONE_NOT_CONNECTED: &str = "None";

/// Mask a card number down to `first4****last4`.
///
/// Card numbers are confidential identifiers: every response, error message
/// and log line goes through this.
pub fn mask_card_number(number: &str) -> String {
    match (number.get(..4), number.get(number.len().saturating_sub(4)..)) {
        (Some(head), Some(tail)) if number.len() >= 8 => format!("{}****{}", head, tail),
        _ => "****".to_string(),
    }
}

/// Card status as kept in `cards_tb.status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Active,
    Inactive,
    Expired,
}

impl CardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardStatus::Active => "active",
            CardStatus::Inactive => "inactive",
            CardStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(CardStatus::Active),
            "inactive" => Some(CardStatus::Inactive),
            "expired" => Some(CardStatus::Expired),
            _ => None,
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered payment card as stored in `cards_tb`
#[derive(Debug, Clone)]
pub struct Card {
    pub card_number: String,
    pub expire: String,
    pub phone: Option<String>,
    pub status: CardStatus,
    pub balance: Decimal,
    pub version: i64,
}

impl Card {
    /// Whether the card has a usable SMS channel on file
    pub fn sms_connected(&self) -> bool {
        match self.phone.as_deref() {
            Some(p) => !p.is_empty() && p != PHONE_NOT_CONNECTED,
            None => false,
        }
    }

    pub fn masked_number(&self) -> String {
        mask_card_number(&self.card_number)
    }

    /// Public view returned by `card.info`
    pub fn info(&self) -> CardInfo {
        CardInfo {
            card_number: self.masked_number(),
            expire: self.expire.clone(),
            balance: self.balance,
            status: self.status,
        }
    }
}

/// Masked card view; the only card shape that ever leaves the service
#[derive(Debug, Clone, Serialize)]
pub struct CardInfo {
    pub card_number: String,
    pub expire: String,
    pub balance: Decimal,
    pub status: CardStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(phone: Option<&str>) -> Card {
        Card {
            card_number: "8600123456789012".to_string(),
            expire: "11/25".to_string(),
            phone: phone.map(|p| p.to_string()),
            status: CardStatus::Active,
            balance: "1000.00".parse().unwrap(),
            version: 0,
        }
    }

    #[test]
    fn mask_keeps_first_and_last_four() {
        assert_eq!(mask_card_number("8600123456789012"), "8600****9012");
    }

    #[test]
    fn mask_never_exposes_short_values() {
        assert_eq!(mask_card_number("1234567"), "****");
        assert_eq!(mask_card_number(""), "****");
    }

    #[test]
    fn sms_connected_rejects_sentinel_and_empty() {
        assert!(card(Some("+998901234567")).sms_connected());
        assert!(!card(Some("None")).sms_connected());
        assert!(!card(Some("")).sms_connected());
        assert!(!card(None).sms_connected());
    }

    #[test]
    fn info_masks_the_number() {
        let info = card(Some("+998901234567")).info();
        assert_eq!(info.card_number, "8600****9012");
        assert_eq!(info.expire, "11/25");
        assert_eq!(info.status, CardStatus::Active);
    }

    #[test]
    fn status_roundtrip() {
        for s in [CardStatus::Active, CardStatus::Inactive, CardStatus::Expired] {
            assert_eq!(CardStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(CardStatus::parse("ACTIVE"), None);
        assert_eq!(CardStatus::parse(""), None);
    }
}
