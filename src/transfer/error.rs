//! Transfer Error Types
//!
//! The single error taxonomy for the card-to-card transfer flow. Every
//! variant maps to a stable machine-readable code plus the numeric RPC code
//! the API contract promises.

use thiserror::Error;

use crate::card::ValidationError;

/// Transfer error types
///
/// Messages never carry unmasked card numbers or OTP plaintext.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransferError {
    // === Sender validation ===
    #[error("Sender card not found")]
    SenderNotFound,

    #[error("Sender card expired")]
    SenderExpired,

    #[error("Sender card is not active")]
    SenderInactive,

    #[error("SMS is not connected for the sender card")]
    SmsNotConnected,

    #[error("Phone number does not match the sender card")]
    PhoneMismatch,

    #[error("Insufficient balance")]
    InsufficientBalance,

    // === Receiver validation ===
    #[error("Receiver card not found")]
    ReceiverNotFound,

    #[error("Receiver card is not valid")]
    ReceiverInvalid,

    #[error("Receiver card expired")]
    ReceiverExpired,

    #[error("SMS is not connected for the receiver card")]
    ReceiverSmsNotConnected,

    // === Card lookup ===
    #[error("Card not found")]
    CardNotFound,

    // === Request shape ===
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Amount precision exceeds 2 decimal places")]
    PrecisionOverflow,

    // === Conversion ===
    #[error("Exchange rate not found for currency {0}")]
    RateUnavailable(String),

    // === Idempotency ===
    #[error("Transfer with this ext_id already exists")]
    Duplicate,

    // === Confirmation ===
    #[error("Transfer not found")]
    TransferNotFound,

    #[error("Confirmation attempts exceeded")]
    AttemptsExceeded,

    #[error("Wrong confirmation code")]
    InvalidCode,

    #[error("Operation is not valid for the current transfer state")]
    InvalidState,

    #[error("Insufficient balance to confirm the transfer")]
    InsufficientFunds,

    // === Cancellation ===
    #[error("Transfer is not confirmed, nothing to cancel")]
    NotConfirmed,

    #[error("Transfer already cancelled")]
    AlreadyCancelled,

    #[error("Receiver balance is insufficient to refund")]
    InsufficientFundsToRefund,

    // === System ===
    #[error("Conflicting concurrent update")]
    Conflict,

    #[error("Database error: {0}")]
    Storage(String),

    #[error("Internal system error: {0}")]
    Internal(String),
}

impl TransferError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::SenderNotFound => "SENDER_NOT_FOUND",
            TransferError::SenderExpired => "SENDER_EXPIRED",
            TransferError::SenderInactive => "SENDER_INACTIVE",
            TransferError::SmsNotConnected => "SMS_NOT_CONNECTED",
            TransferError::PhoneMismatch => "PHONE_MISMATCH",
            TransferError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            TransferError::ReceiverNotFound => "RECEIVER_NOT_FOUND",
            TransferError::ReceiverInvalid => "RECEIVER_INVALID",
            TransferError::ReceiverExpired => "RECEIVER_EXPIRED",
            TransferError::ReceiverSmsNotConnected => "RECEIVER_SMS_NOT_CONNECTED",
            TransferError::CardNotFound => "CARD_NOT_FOUND",
            TransferError::Validation(_) => "VALIDATION_FAILURE",
            TransferError::InvalidAmount => "INVALID_AMOUNT",
            TransferError::PrecisionOverflow => "PRECISION_OVERFLOW",
            TransferError::RateUnavailable(_) => "RATE_UNAVAILABLE",
            TransferError::Duplicate => "DUPLICATE_EXT_ID",
            TransferError::TransferNotFound => "TRANSFER_NOT_FOUND",
            TransferError::AttemptsExceeded => "ATTEMPTS_EXCEEDED",
            TransferError::InvalidCode => "INVALID_CODE",
            TransferError::InvalidState => "INVALID_STATE",
            TransferError::InsufficientFunds => "INSUFFICIENT_FUNDS",
            TransferError::NotConfirmed => "NOT_CONFIRMED",
            TransferError::AlreadyCancelled => "ALREADY_CANCELLED",
            TransferError::InsufficientFundsToRefund => "INSUFFICIENT_FUNDS_TO_REFUND",
            TransferError::Conflict => "CONFLICT",
            TransferError::Storage(_) => "STORAGE_ERROR",
            TransferError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Numeric code carried in RPC error responses.
    ///
    /// 123 for an already-cancelled transfer is part of the public contract,
    /// odd as it looks next to the HTTP-shaped neighbours.
    pub fn rpc_code(&self) -> i32 {
        match self {
            TransferError::SenderNotFound
            | TransferError::ReceiverNotFound
            | TransferError::CardNotFound
            | TransferError::TransferNotFound => 404,
            TransferError::SenderExpired
            | TransferError::SenderInactive
            | TransferError::SmsNotConnected
            | TransferError::PhoneMismatch
            | TransferError::InsufficientBalance
            | TransferError::ReceiverInvalid
            | TransferError::ReceiverExpired
            | TransferError::ReceiverSmsNotConnected
            | TransferError::Validation(_)
            | TransferError::InvalidAmount
            | TransferError::PrecisionOverflow
            | TransferError::RateUnavailable(_)
            | TransferError::InvalidCode
            | TransferError::InvalidState
            | TransferError::InsufficientFunds
            | TransferError::NotConfirmed
            | TransferError::InsufficientFundsToRefund => 400,
            TransferError::Duplicate | TransferError::Conflict => 409,
            TransferError::AttemptsExceeded => 429,
            TransferError::AlreadyCancelled => 123,
            TransferError::Storage(_) | TransferError::Internal(_) => 500,
        }
    }

    /// Message safe to return to the caller. Internal failures are reported
    /// opaquely; everything else displays as-is (already mask-safe).
    pub fn public_message(&self) -> String {
        match self {
            TransferError::Storage(_) | TransferError::Internal(_) => {
                "Internal error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for TransferError {
    fn from(e: sqlx::Error) -> Self {
        TransferError::Storage(e.to_string())
    }
}

impl From<anyhow::Error> for TransferError {
    fn from(e: anyhow::Error) -> Self {
        TransferError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(TransferError::SenderNotFound.code(), "SENDER_NOT_FOUND");
        assert_eq!(
            TransferError::InsufficientBalance.code(),
            "INSUFFICIENT_BALANCE"
        );
        assert_eq!(TransferError::Duplicate.code(), "DUPLICATE_EXT_ID");
        assert_eq!(TransferError::AttemptsExceeded.code(), "ATTEMPTS_EXCEEDED");
    }

    #[test]
    fn test_rpc_codes() {
        assert_eq!(TransferError::SenderNotFound.rpc_code(), 404);
        assert_eq!(TransferError::TransferNotFound.rpc_code(), 404);
        assert_eq!(TransferError::InvalidCode.rpc_code(), 400);
        assert_eq!(TransferError::Duplicate.rpc_code(), 409);
        assert_eq!(TransferError::AttemptsExceeded.rpc_code(), 429);
        assert_eq!(TransferError::AlreadyCancelled.rpc_code(), 123);
        assert_eq!(TransferError::Storage("x".into()).rpc_code(), 500);
    }

    #[test]
    fn test_public_message_hides_internals() {
        let e = TransferError::Storage("connection refused to 10.0.0.5".into());
        assert_eq!(e.public_message(), "Internal error");
        assert_eq!(
            TransferError::InvalidCode.public_message(),
            "Wrong confirmation code"
        );
    }

    #[test]
    fn test_validation_error_folds_in() {
        let v = ValidationError::InvalidLength {
            field: "card_number",
            expected: "16 digits",
            actual: 12,
        };
        let e: TransferError = v.into();
        assert_eq!(e.code(), "VALIDATION_FAILURE");
        assert_eq!(e.rpc_code(), 400);
    }

    #[test]
    fn test_display() {
        let err = TransferError::InsufficientBalance;
        assert_eq!(err.to_string(), "Insufficient balance");
    }
}
