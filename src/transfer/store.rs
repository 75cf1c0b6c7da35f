//! Transfer persistence
//!
//! All state flips are atomic CAS updates conditioned on the expected
//! current state; the unique index on `ext_id` is the authoritative
//! idempotency guard.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};

use super::error::TransferError;
use super::models::{NewTransfer, Transfer, TransferSummary};
use super::state::TransferState;

const TRANSFER_COLUMNS: &str = "id, ext_id, sender_card_number, sender_card_expiry, sender_phone, \
     receiver_card_number, receiver_phone, sending_amount, currency, receiving_amount, \
     state, try_count, otp_hash, created_at, confirmed_at, cancelled_at, updated_at";

/// Transfer database operations
pub struct TransferStore {
    pool: PgPool,
}

impl TransferStore {
    /// Create a new TransferStore with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The engine opens confirm/cancel transactions on this pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Fast duplicate probe for create. The insert's unique index is the
    /// authoritative check; this keeps the common duplicate from doing any
    /// further work.
    pub async fn exists(&self, ext_id: &str) -> Result<bool, TransferError> {
        let found = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM transfers_tb WHERE ext_id = $1)",
        )
        .bind(ext_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(found)
    }

    /// Insert a new transfer in `created` state.
    ///
    /// A unique violation on `ext_id` maps to `Duplicate`, so two racing
    /// creates with the same id cannot both succeed.
    pub async fn insert(&self, new: &NewTransfer) -> Result<Transfer, TransferError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO transfers_tb
                (ext_id, sender_card_number, sender_card_expiry, sender_phone,
                 receiver_card_number, receiver_phone, sending_amount, currency,
                 receiving_amount, state, try_count, otp_hash, created_at, updated_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 0, $11, NOW(), NOW())
            RETURNING {TRANSFER_COLUMNS}
            "#
        ))
        .bind(&new.ext_id)
        .bind(&new.sender_card_number)
        .bind(&new.sender_card_expiry)
        .bind(&new.sender_phone)
        .bind(&new.receiver_card_number)
        .bind(&new.receiver_phone)
        .bind(new.sending_amount)
        .bind(&new.currency)
        .bind(new.receiving_amount)
        .bind(TransferState::Created.as_str())
        .bind(&new.otp_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            // 23505 = Postgres unique_violation
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                TransferError::Duplicate
            }
            _ => TransferError::from(e),
        })?;

        self.row_to_transfer(&row)
    }

    /// Get a transfer by ext_id
    pub async fn get(&self, ext_id: &str) -> Result<Option<Transfer>, TransferError> {
        let row = sqlx::query(&format!(
            "SELECT {TRANSFER_COLUMNS} FROM transfers_tb WHERE ext_id = $1"
        ))
        .bind(ext_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.row_to_transfer(&row)?)),
            None => Ok(None),
        }
    }

    /// Current state only, for the `transfer_state` read
    pub async fn get_state(&self, ext_id: &str) -> Result<Option<TransferState>, TransferError> {
        let state: Option<String> =
            sqlx::query_scalar("SELECT state FROM transfers_tb WHERE ext_id = $1")
                .bind(ext_id)
                .fetch_optional(&self.pool)
                .await?;

        match state {
            Some(s) => {
                let parsed = TransferState::parse(&s).ok_or_else(|| {
                    TransferError::Internal(format!("Invalid transfer state: {}", s))
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Lock the transfer row inside `tx`; serializes confirm/cancel per
    /// ext_id.
    pub async fn lock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ext_id: &str,
    ) -> Result<Option<Transfer>, TransferError> {
        let row = sqlx::query(&format!(
            "SELECT {TRANSFER_COLUMNS} FROM transfers_tb WHERE ext_id = $1 FOR UPDATE"
        ))
        .bind(ext_id)
        .fetch_optional(&mut **tx)
        .await?;

        match row {
            Some(row) => Ok(Some(self.row_to_transfer(&row)?)),
            None => Ok(None),
        }
    }

    /// Persist one failed confirmation attempt; returns the new count.
    pub async fn record_failed_attempt(&self, ext_id: &str) -> Result<i32, TransferError> {
        let count = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE transfers_tb
            SET try_count = try_count + 1, updated_at = NOW()
            WHERE ext_id = $1
            RETURNING try_count
            "#,
        )
        .bind(ext_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Atomic CAS update: flip state only if the current state matches.
    ///
    /// Stamps `confirmed_at`/`cancelled_at` for the respective targets.
    /// Returns true if the update applied, false if the state had moved.
    pub async fn update_state_if(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        expected: TransferState,
        new_state: TransferState,
    ) -> Result<bool, TransferError> {
        let result = sqlx::query(
            r#"
            UPDATE transfers_tb
            SET state = $1,
                confirmed_at = CASE WHEN $1 = 'confirmed' THEN NOW() ELSE confirmed_at END,
                cancelled_at = CASE WHEN $1 = 'cancelled' THEN NOW() ELSE cancelled_at END,
                updated_at = NOW()
            WHERE id = $2 AND state = $3
            "#,
        )
        .bind(new_state.as_str())
        .bind(id)
        .bind(expected.as_str())
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Transfers sent from one card, optionally bounded by date and state.
    ///
    /// Bounds are inclusive at midnight UTC of the named day. Rows come back
    /// in insertion order.
    pub async fn filter(
        &self,
        sender_card_number: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        state: Option<TransferState>,
    ) -> Result<Vec<TransferSummary>, TransferError> {
        let mut qb = sqlx::QueryBuilder::<Postgres>::new(
            "SELECT ext_id, sending_amount, currency, receiver_card_number, state, created_at \
             FROM transfers_tb WHERE sender_card_number = ",
        );
        qb.push_bind(sender_card_number);

        if let Some(start) = start_date {
            qb.push(" AND created_at >= ");
            qb.push_bind(day_start(start));
        }
        if let Some(end) = end_date {
            qb.push(" AND created_at <= ");
            qb.push_bind(day_start(end));
        }
        if let Some(state) = state {
            qb.push(" AND state = ");
            qb.push_bind(state.as_str());
        }
        qb.push(" ORDER BY id");

        let rows = qb.build().fetch_all(&self.pool).await?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in rows {
            let state_str: String = row.get("state");
            let state = TransferState::parse(&state_str).ok_or_else(|| {
                TransferError::Internal(format!("Invalid transfer state: {}", state_str))
            })?;
            summaries.push(TransferSummary {
                ext_id: row.get("ext_id"),
                amount: row.get("sending_amount"),
                currency: row.get("currency"),
                receiver_card_number: row.get("receiver_card_number"),
                state,
                created_at: row.get("created_at"),
            });
        }
        Ok(summaries)
    }

    /// Total transfer count (daily report)
    pub async fn count(&self) -> Result<i64, TransferError> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM transfers_tb")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    /// Convert database row to Transfer
    fn row_to_transfer(&self, row: &sqlx::postgres::PgRow) -> Result<Transfer, TransferError> {
        let state_str: String = row.get("state");
        let state = TransferState::parse(&state_str).ok_or_else(|| {
            TransferError::Internal(format!("Invalid transfer state: {}", state_str))
        })?;

        Ok(Transfer {
            id: row.get("id"),
            ext_id: row.get("ext_id"),
            sender_card_number: row.get("sender_card_number"),
            sender_card_expiry: row.get("sender_card_expiry"),
            sender_phone: row.get("sender_phone"),
            receiver_card_number: row.get("receiver_card_number"),
            receiver_phone: row.get("receiver_phone"),
            sending_amount: row.get("sending_amount"),
            currency: row.get("currency"),
            receiving_amount: row.get("receiving_amount"),
            state,
            try_count: row.get("try_count"),
            otp_hash: row.get("otp_hash"),
            created_at: row.get("created_at"),
            confirmed_at: row.get("confirmed_at"),
            cancelled_at: row.get("cancelled_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

/// Midnight UTC of a calendar day
fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_start_is_midnight_utc() {
        let d = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        let dt = day_start(d);
        assert_eq!(dt.to_rfc3339(), "2026-08-25T00:00:00+00:00");
    }
}
