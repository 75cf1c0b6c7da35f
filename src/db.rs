//! Database connection management

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// PostgreSQL database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        tracing::info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Create the ledger tables if they do not exist yet.
    ///
    /// Idempotent; runs at every startup so a fresh database is usable
    /// without a separate migration step.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cards_tb (
                card_number  TEXT PRIMARY KEY,
                expire       TEXT NOT NULL,
                phone        TEXT,
                status       TEXT NOT NULL DEFAULT 'active',
                balance      NUMERIC(20,2) NOT NULL DEFAULT 0,
                version      BIGINT NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transfers_tb (
                id                   BIGSERIAL PRIMARY KEY,
                ext_id               TEXT NOT NULL UNIQUE,
                sender_card_number   TEXT NOT NULL,
                sender_card_expiry   TEXT NOT NULL,
                sender_phone         TEXT NOT NULL,
                receiver_card_number TEXT NOT NULL,
                receiver_phone       TEXT NOT NULL,
                sending_amount       NUMERIC(20,2) NOT NULL,
                currency             TEXT NOT NULL,
                receiving_amount     NUMERIC(20,2) NOT NULL,
                state                TEXT NOT NULL DEFAULT 'created',
                try_count            INT NOT NULL DEFAULT 0,
                otp_hash             TEXT NOT NULL,
                created_at           TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                confirmed_at         TIMESTAMPTZ,
                cancelled_at         TIMESTAMPTZ,
                updated_at           TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_transfers_sender \
             ON transfers_tb (sender_card_number, created_at)",
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("Ledger schema ensured");
        Ok(())
    }
}
