//! Privateer license repository
//!
//! One row per player who ever held a license; dismissal only flips
//! `is_active`, so re-issuance reactivates the existing row.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::engine::{Privateer, ShipKind};

use super::StoreError;

#[derive(Debug, Clone)]
pub struct PrivateerRepository {
    pool: PgPool,
}

type PrivateerRow = (
    String,
    String,
    DateTime<Utc>,
    i32,
    String,
    DateTime<Utc>,
    bool,
);

fn privateer_from_row(row: PrivateerRow) -> Result<Privateer, StoreError> {
    let (player_id, ship, last_payment_at, complaints, licensed_by, licensed_at, is_active) = row;
    let ship = ShipKind::parse(&ship)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown ship kind {ship}")))?;
    Ok(Privateer {
        player_id,
        ship,
        last_payment_at,
        complaints,
        licensed_by,
        licensed_at,
        is_active,
    })
}

const SELECT_COLS: &str =
    "player_id, ship, last_payment_at, complaints, licensed_by, licensed_at, is_active";

impl PrivateerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, privateer: &Privateer) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO privateers (
                player_id, ship, last_payment_at, complaints,
                licensed_by, licensed_at, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&privateer.player_id)
        .bind(privateer.ship.as_str())
        .bind(privateer.last_payment_at)
        .bind(privateer.complaints)
        .bind(&privateer.licensed_by)
        .bind(privateer.licensed_at)
        .bind(privateer.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Look up a player's license regardless of active state.
    pub async fn get_by_player(&self, player_id: &str) -> Result<Option<Privateer>, StoreError> {
        let row: Option<PrivateerRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLS} FROM privateers WHERE player_id = $1"
        ))
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(privateer_from_row).transpose()
    }

    /// Look up a player's license only if it is active.
    pub async fn get_active(&self, player_id: &str) -> Result<Option<Privateer>, StoreError> {
        let row: Option<PrivateerRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLS} FROM privateers WHERE player_id = $1 AND is_active = TRUE"
        ))
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(privateer_from_row).transpose()
    }

    /// All active licenses.
    pub async fn list_active(&self) -> Result<Vec<Privateer>, StoreError> {
        let rows: Vec<PrivateerRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLS} FROM privateers WHERE is_active = TRUE ORDER BY licensed_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(privateer_from_row).collect()
    }

    /// Write a mutated license back.
    pub async fn update(&self, privateer: &Privateer) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE privateers
            SET ship = $2,
                last_payment_at = $3,
                complaints = $4,
                licensed_by = $5,
                licensed_at = $6,
                is_active = $7
            WHERE player_id = $1
            "#,
        )
        .bind(&privateer.player_id)
        .bind(privateer.ship.as_str())
        .bind(privateer.last_payment_at)
        .bind(privateer.complaints)
        .bind(&privateer.licensed_by)
        .bind(privateer.licensed_at)
        .bind(privateer.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
