//! Transfer record types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::state::TransferState;
use crate::card::mask_card_number;

/// One row of `transfers_tb`
#[derive(Debug, Clone)]
pub struct Transfer {
    pub id: i64,
    /// Caller-supplied idempotency key
    pub ext_id: String,
    pub sender_card_number: String,
    pub sender_card_expiry: String,
    pub sender_phone: String,
    pub receiver_card_number: String,
    pub receiver_phone: String,
    /// Source-currency amount the sender asked to move
    pub sending_amount: Decimal,
    /// Source currency code
    pub currency: String,
    /// Settlement-currency amount, frozen at create time
    pub receiving_amount: Decimal,
    pub state: TransferState,
    pub try_count: i32,
    /// Sealed OTP (argon2 PHC string); plaintext is never stored
    pub otp_hash: String,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Transfer {
    pub fn masked_sender(&self) -> String {
        mask_card_number(&self.sender_card_number)
    }

    pub fn masked_receiver(&self) -> String {
        mask_card_number(&self.receiver_card_number)
    }
}

/// Validated create request handed to the engine
#[derive(Debug, Clone)]
pub struct CreateTransfer {
    pub ext_id: String,
    pub sender_card_number: String,
    pub sender_card_expiry: String,
    pub sender_phone: String,
    pub receiver_card_number: String,
    pub receiver_phone: String,
    pub sending_amount: Decimal,
    pub currency: String,
}

/// Insert payload produced by the engine after validation and conversion
#[derive(Debug, Clone)]
pub struct NewTransfer {
    pub ext_id: String,
    pub sender_card_number: String,
    pub sender_card_expiry: String,
    pub sender_phone: String,
    pub receiver_card_number: String,
    pub receiver_phone: String,
    pub sending_amount: Decimal,
    pub currency: String,
    pub receiving_amount: Decimal,
    pub otp_hash: String,
}

/// One `transfer_filter` result row. The receiver number is raw here; the
/// transport layer masks it before anything leaves the service.
#[derive(Debug, Clone)]
pub struct TransferSummary {
    pub ext_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub receiver_card_number: String,
    pub state: TransferState,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masked_accessors_hide_card_digits() {
        let t = Transfer {
            id: 1,
            ext_id: "T1".to_string(),
            sender_card_number: "8600123456789012".to_string(),
            sender_card_expiry: "11/30".to_string(),
            sender_phone: "+998901234567".to_string(),
            receiver_card_number: "8600999988887777".to_string(),
            receiver_phone: "+998907654321".to_string(),
            sending_amount: Decimal::new(10000, 2),
            currency: "860".to_string(),
            receiving_amount: Decimal::new(10000, 2),
            state: TransferState::Created,
            try_count: 0,
            otp_hash: "$argon2id$...".to_string(),
            created_at: Utc::now(),
            confirmed_at: None,
            cancelled_at: None,
            updated_at: Utc::now(),
        };
        assert_eq!(t.masked_sender(), "8600****9012");
        assert_eq!(t.masked_receiver(), "8600****7777");
    }
}
