use chrono::NaiveDate;
use log::{debug, info};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::Result;
use crate::store::{month_bucket, DayStore};

/// Repository for the raw daily records and monthly summaries.
///
/// Both writes for one day run inside a single transaction, so a failure in
/// either leaves the database untouched for that day.
#[derive(Debug, Clone)]
pub struct PriceStore {
    pool: PgPool,
}

impl PriceStore {
    /// Connect to PostgreSQL. The pipeline is strictly sequential, so a
    /// single pooled connection is enough.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;
        info!("connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Create both tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS coin_raw_data (
                coin_id            TEXT NOT NULL,
                data_date          DATE NOT NULL,
                price_usd          DOUBLE PRECISION NOT NULL,
                full_json_response JSONB NOT NULL,
                PRIMARY KEY (coin_id, data_date)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS coin_monthly_summary (
                coin_id       TEXT NOT NULL,
                month_bucket  DATE NOT NULL,
                min_price_usd DOUBLE PRECISION NOT NULL,
                max_price_usd DOUBLE PRECISION NOT NULL,
                PRIMARY KEY (coin_id, month_bucket)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl DayStore for PriceStore {
    async fn persist_day(
        &self,
        coin_id: &str,
        day: NaiveDate,
        price: f64,
        document: &Value,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        upsert_raw(&mut tx, coin_id, day, price, document).await?;
        merge_monthly(&mut tx, coin_id, day, price).await?;

        tx.commit().await?;
        debug!("committed raw record and monthly summary for {coin_id} on {day}");
        Ok(())
    }
}

/// Insert or overwrite the raw record for one (coin, day). Last write wins;
/// re-running with identical inputs is a no-op in effect.
async fn upsert_raw(
    tx: &mut Transaction<'_, Postgres>,
    coin_id: &str,
    day: NaiveDate,
    price: f64,
    document: &Value,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO coin_raw_data (coin_id, data_date, price_usd, full_json_response)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (coin_id, data_date) DO UPDATE SET
            price_usd = EXCLUDED.price_usd,
            full_json_response = EXCLUDED.full_json_response
        "#,
    )
    .bind(coin_id)
    .bind(day)
    .bind(price)
    .bind(document)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Widen the (min, max) summary for the day's month. `LEAST`/`GREATEST` keep
/// the merge commutative and idempotent, so the range never contracts.
async fn merge_monthly(
    tx: &mut Transaction<'_, Postgres>,
    coin_id: &str,
    day: NaiveDate,
    price: f64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO coin_monthly_summary (coin_id, month_bucket, min_price_usd, max_price_usd)
        VALUES ($1, $2, $3, $3)
        ON CONFLICT (coin_id, month_bucket) DO UPDATE SET
            min_price_usd = LEAST(coin_monthly_summary.min_price_usd, EXCLUDED.min_price_usd),
            max_price_usd = GREATEST(coin_monthly_summary.max_price_usd, EXCLUDED.max_price_usd)
        "#,
    )
    .bind(coin_id)
    .bind(month_bucket(day))
    .bind(price)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
