//! Dynamic good price repository
//!
//! One row per good that has ever been sold on the Britain table. Creation
//! is lazy: the first sale of a good materializes its row with the
//! configured defaults.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::engine::{GoodPrice, PriceDefaults};

use super::StoreError;

#[derive(Debug, Clone)]
pub struct GoodPriceRepository {
    pool: PgPool,
}

type PriceRow = (String, Decimal, Decimal, i32, i64, i32, DateTime<Utc>);

fn price_from_row(row: PriceRow) -> GoodPrice {
    let (good_name, current_price, pmax, n_for_drop, t_recovery_secs, sales_count, last_update) =
        row;
    GoodPrice {
        good_name,
        current_price,
        pmax,
        n_for_drop,
        t_recovery_secs,
        sales_count,
        last_update,
    }
}

impl GoodPriceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the price record for a good, if one exists.
    pub async fn get(&self, good_name: &str) -> Result<Option<GoodPrice>, StoreError> {
        let row: Option<PriceRow> = sqlx::query_as(
            r#"
            SELECT good_name, current_price, pmax, n_for_drop, t_recovery_secs,
                   sales_count, last_update
            FROM good_prices
            WHERE good_name = $1
            "#,
        )
        .bind(good_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(price_from_row))
    }

    /// Fetch the record for a good, creating it with `defaults` on first
    /// contact. Idempotent on existence.
    pub async fn get_or_create(
        &self,
        good_name: &str,
        defaults: PriceDefaults,
        now: DateTime<Utc>,
    ) -> Result<GoodPrice, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO good_prices (
                good_name, current_price, pmax, n_for_drop, t_recovery_secs,
                sales_count, last_update
            )
            VALUES ($1, $2, $2, $3, $4, 0, $5)
            ON CONFLICT (good_name) DO NOTHING
            "#,
        )
        .bind(good_name)
        .bind(defaults.pmax)
        .bind(defaults.n_for_drop)
        .bind(defaults.t_recovery_secs)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let record = self.get(good_name).await?;
        record.ok_or_else(|| StoreError::Corrupt(format!("good {good_name} vanished after insert")))
    }

    /// Write a mutated price record back.
    pub async fn save(&self, price: &GoodPrice) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE good_prices
            SET current_price = $2,
                sales_count = $3,
                last_update = $4
            WHERE good_name = $1
            "#,
        )
        .bind(&price.good_name)
        .bind(price.current_price)
        .bind(price.sales_count)
        .bind(price.last_update)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
