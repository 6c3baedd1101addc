//! Constructed building repository

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::engine::{Building, BuildingKind};

use super::StoreError;

#[derive(Debug, Clone)]
pub struct BuildingRepository {
    pool: PgPool,
}

type BuildingRow = (
    Uuid,
    String,
    String,
    String,
    String,
    DateTime<Utc>,
    Decimal,
    Decimal,
    DateTime<Utc>,
);

fn building_from_row(row: BuildingRow) -> Result<Building, StoreError> {
    let (id, building_name, kind, owner_id, built_by, built_at, cost, income, last_collected) = row;
    let kind = BuildingKind::parse(&kind)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown building kind {kind}")))?;
    Ok(Building {
        id,
        building_name,
        kind,
        owner_id,
        built_by,
        built_at,
        cost,
        income_per_minute: income,
        last_profit_collected: last_collected,
    })
}

const SELECT_COLS: &str = "id, building_name, kind, owner_id, built_by, built_at, cost, \
                           income_per_minute, last_profit_collected";

impl BuildingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, building: &Building) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO buildings (
                id, building_name, kind, owner_id, built_by, built_at, cost,
                income_per_minute, last_profit_collected
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(building.id)
        .bind(&building.building_name)
        .bind(building.kind.as_str())
        .bind(&building.owner_id)
        .bind(&building.built_by)
        .bind(building.built_at)
        .bind(building.cost)
        .bind(building.income_per_minute)
        .bind(building.last_profit_collected)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Building>, StoreError> {
        let row: Option<BuildingRow> =
            sqlx::query_as(&format!("SELECT {SELECT_COLS} FROM buildings WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(building_from_row).transpose()
    }

    /// All buildings, newest construction first.
    pub async fn list(&self) -> Result<Vec<Building>, StoreError> {
        let rows: Vec<BuildingRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLS} FROM buildings ORDER BY built_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(building_from_row).collect()
    }

    /// Businesses only, ordered by the longest-uncollected first.
    pub async fn list_businesses(&self) -> Result<Vec<Building>, StoreError> {
        let rows: Vec<BuildingRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLS} FROM buildings WHERE kind = 'business' \
             ORDER BY last_profit_collected ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(building_from_row).collect()
    }

    /// Buildings owned by one player.
    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Building>, StoreError> {
        let rows: Vec<BuildingRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLS} FROM buildings WHERE owner_id = $1 ORDER BY built_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(building_from_row).collect()
    }

    /// Persist a profit collection: only the timer moves.
    pub async fn save_profit_timer(&self, building: &Building) -> Result<(), StoreError> {
        sqlx::query("UPDATE buildings SET last_profit_collected = $2 WHERE id = $1")
            .bind(building.id)
            .bind(building.last_profit_collected)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Remove a demolished building. Returns whether a row was deleted.
    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM buildings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
