//! Card registry
//!
//! Lookup and validation of registered cards plus the two atomic balance
//! mutations (transfer and reversal). Balance updates are conditional
//! (`balance >= amount` guard + version bump) and always run inside the
//! caller's open transaction; any error aborts the whole unit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Row, Transaction};

use super::expiry::ExpiryDate;
use super::models::{Card, CardStatus};
use super::validate::{CardNumber, Phone};
use crate::transfer::error::TransferError;

/// Card store operations
pub struct CardRegistry {
    pool: PgPool,
}

impl CardRegistry {
    /// Create a new CardRegistry with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Exact lookup by number + expiry, the `card.info` key
    pub async fn get(
        &self,
        card_number: &str,
        expire: &str,
    ) -> Result<Option<Card>, TransferError> {
        let row = sqlx::query(
            r#"
            SELECT card_number, expire, phone, status, balance, version
            FROM cards_tb
            WHERE card_number = $1 AND expire = $2
            "#,
        )
        .bind(card_number)
        .bind(expire)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.row_to_card(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_number(&self, card_number: &str) -> Result<Option<Card>, TransferError> {
        let row = sqlx::query(
            r#"
            SELECT card_number, expire, phone, status, balance, version
            FROM cards_tb
            WHERE card_number = $1
            "#,
        )
        .bind(card_number)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.row_to_card(&row)?)),
            None => Ok(None),
        }
    }

    /// Validate the sending card for a transfer of `amount`.
    ///
    /// The expiry checked here is the caller-supplied one; the check order
    /// (existence, expiry, status, SMS channel, phone match, balance) is part
    /// of the API contract since each step has its own error.
    pub async fn validate_for_send(
        &self,
        card_number: &CardNumber,
        expiry: &ExpiryDate,
        phone: &Phone,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Card, TransferError> {
        let card = self
            .get_by_number(card_number.as_str())
            .await?
            .ok_or(TransferError::SenderNotFound)?;

        if expiry.is_expired_at(now) {
            return Err(TransferError::SenderExpired);
        }
        if card.status != CardStatus::Active {
            return Err(TransferError::SenderInactive);
        }
        if !card.sms_connected() {
            return Err(TransferError::SmsNotConnected);
        }
        if card.phone.as_deref() != Some(phone.as_str()) {
            return Err(TransferError::PhoneMismatch);
        }
        if card.balance < amount {
            return Err(TransferError::InsufficientBalance);
        }

        Ok(card)
    }

    /// Validate the receiving card. The caller supplies no expiry for the
    /// receiver, so the stored one is checked.
    pub async fn validate_for_receive(
        &self,
        card_number: &CardNumber,
        now: DateTime<Utc>,
    ) -> Result<Card, TransferError> {
        let card = self
            .get_by_number(card_number.as_str())
            .await?
            .ok_or(TransferError::ReceiverNotFound)?;

        if card.status != CardStatus::Active {
            return Err(TransferError::ReceiverInvalid);
        }
        let stored_expiry = ExpiryDate::parse(&card.expire).map_err(|_| {
            TransferError::Internal(format!(
                "card {} has malformed expiry on file",
                card.masked_number()
            ))
        })?;
        if stored_expiry.is_expired_at(now) {
            return Err(TransferError::ReceiverExpired);
        }
        if !card.sms_connected() {
            return Err(TransferError::ReceiverSmsNotConnected);
        }

        Ok(card)
    }

    /// Debit sender / credit receiver as one unit inside `tx`.
    ///
    /// The debit re-validates sufficiency: a sender balance that dropped
    /// since create fails the conditional update and the transfer stays
    /// unconfirmed.
    pub async fn atomic_transfer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sender: &str,
        receiver: &str,
        debit_amount: Decimal,
        credit_amount: Decimal,
    ) -> Result<(), TransferError> {
        // Rows are locked in ascending card-number order so two transfers
        // over the same pair in opposite directions cannot deadlock.
        if sender <= receiver {
            if !self.debit_if_sufficient(tx, sender, debit_amount).await? {
                return Err(TransferError::InsufficientFunds);
            }
            self.credit(tx, receiver, credit_amount).await?;
        } else {
            self.credit(tx, receiver, credit_amount).await?;
            if !self.debit_if_sufficient(tx, sender, debit_amount).await? {
                return Err(TransferError::InsufficientFunds);
            }
        }
        Ok(())
    }

    /// Reverse a confirmed transfer inside `tx`: debit the receiver by the
    /// frozen receiving amount, credit the sender back the sending amount.
    pub async fn atomic_reverse(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sender: &str,
        receiver: &str,
        credit_back: Decimal,
        debit_back: Decimal,
    ) -> Result<(), TransferError> {
        if receiver <= sender {
            if !self.debit_if_sufficient(tx, receiver, debit_back).await? {
                return Err(TransferError::InsufficientFundsToRefund);
            }
            self.credit(tx, sender, credit_back).await?;
        } else {
            self.credit(tx, sender, credit_back).await?;
            if !self.debit_if_sufficient(tx, receiver, debit_back).await? {
                return Err(TransferError::InsufficientFundsToRefund);
            }
        }
        Ok(())
    }

    /// Conditional debit. Returns false when the balance guard fails (row
    /// untouched); the caller decides which error that is.
    async fn debit_if_sufficient(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        card_number: &str,
        amount: Decimal,
    ) -> Result<bool, TransferError> {
        let result = sqlx::query(
            r#"
            UPDATE cards_tb
            SET balance = balance - $1, version = version + 1
            WHERE card_number = $2 AND balance >= $1
            "#,
        )
        .bind(amount)
        .bind(card_number)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn credit(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        card_number: &str,
        amount: Decimal,
    ) -> Result<(), TransferError> {
        let result = sqlx::query(
            r#"
            UPDATE cards_tb
            SET balance = balance + $1, version = version + 1
            WHERE card_number = $2
            "#,
        )
        .bind(amount)
        .bind(card_number)
        .execute(&mut **tx)
        .await?;

        // Cards are never deleted; a missing row here means the ledger
        // changed under us.
        if result.rows_affected() == 0 {
            return Err(TransferError::Conflict);
        }
        Ok(())
    }

    /// Total registered cards (daily report)
    pub async fn count(&self) -> Result<i64, TransferError> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cards_tb")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    /// Upsert a card record. Test facility only.
    #[cfg(feature = "mock-api")]
    pub async fn upsert(&self, card: &Card) -> Result<(), TransferError> {
        sqlx::query(
            r#"
            INSERT INTO cards_tb (card_number, expire, phone, status, balance, version)
            VALUES ($1, $2, $3, $4, $5, 0)
            ON CONFLICT (card_number)
            DO UPDATE SET expire = EXCLUDED.expire, phone = EXCLUDED.phone,
                          status = EXCLUDED.status, balance = EXCLUDED.balance,
                          version = cards_tb.version + 1
            "#,
        )
        .bind(&card.card_number)
        .bind(&card.expire)
        .bind(&card.phone)
        .bind(card.status.as_str())
        .bind(card.balance)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Convert database row to Card
    fn row_to_card(&self, row: &sqlx::postgres::PgRow) -> Result<Card, TransferError> {
        let status_str: String = row.get("status");
        let status = CardStatus::parse(&status_str)
            .ok_or_else(|| TransferError::Internal(format!("Invalid card status: {}", status_str)))?;

        Ok(Card {
            card_number: row.get("card_number"),
            expire: row.get("expire"),
            phone: row.get("phone"),
            status,
            balance: row.get("balance"),
            version: row.get("version"),
        })
    }
}
