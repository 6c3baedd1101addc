//! Credit repository
//!
//! One row per active credit, unique per debtor. Closed credits are deleted;
//! the action log keeps the paper trail.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::engine::Credit;

use super::StoreError;

#[derive(Debug, Clone)]
pub struct CreditRepository {
    pool: PgPool,
}

type CreditRow = (
    String,
    Decimal,
    i32,
    Decimal,
    i32,
    Decimal,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
);

fn credit_from_row(row: CreditRow) -> Credit {
    let (
        player_id,
        credit_amount,
        term_months,
        monthly_payment,
        remaining_payments,
        total_paid,
        issued_by,
        issued_at,
        last_payment_at,
    ) = row;
    Credit {
        player_id,
        credit_amount,
        term_months,
        monthly_payment,
        remaining_payments,
        total_paid,
        issued_by,
        issued_at,
        last_payment_at,
    }
}

const SELECT_COLS: &str = "player_id, credit_amount, term_months, monthly_payment, \
                           remaining_payments, total_paid, issued_by, issued_at, last_payment_at";

impl CreditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, credit: &Credit) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO credits (
                player_id, credit_amount, term_months, monthly_payment,
                remaining_payments, total_paid, issued_by, issued_at, last_payment_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&credit.player_id)
        .bind(credit.credit_amount)
        .bind(credit.term_months)
        .bind(credit.monthly_payment)
        .bind(credit.remaining_payments)
        .bind(credit.total_paid)
        .bind(&credit.issued_by)
        .bind(credit.issued_at)
        .bind(credit.last_payment_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_player(&self, player_id: &str) -> Result<Option<Credit>, StoreError> {
        let row: Option<CreditRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLS} FROM credits WHERE player_id = $1"
        ))
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(credit_from_row))
    }

    /// All open credits, oldest last payment first (most at risk on top).
    pub async fn list(&self) -> Result<Vec<Credit>, StoreError> {
        let rows: Vec<CreditRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLS} FROM credits ORDER BY last_payment_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(credit_from_row).collect())
    }

    /// Persist a payment's effect.
    pub async fn update(&self, credit: &Credit) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE credits
            SET remaining_payments = $2,
                total_paid = $3,
                last_payment_at = $4
            WHERE player_id = $1
            "#,
        )
        .bind(&credit.player_id)
        .bind(credit.remaining_payments)
        .bind(credit.total_paid)
        .bind(credit.last_payment_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Drop a closed credit.
    pub async fn delete(&self, player_id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM credits WHERE player_id = $1")
            .bind(player_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
