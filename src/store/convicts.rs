//! Convict repository
//!
//! Island sentencing records. Release deletes the row; time served is a
//! read-side computation against `sentenced_at`.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::StoreError;

/// One sentenced player.
#[derive(Debug, Clone)]
pub struct Convict {
    pub player_id: String,
    pub player_name: String,
    pub crime_description: String,
    pub fine_amount: Decimal,
    pub confiscation: bool,
    pub sentence_years: i32,
    pub sentenced_by: String,
    pub sentenced_at: DateTime<Utc>,
}

impl Convict {
    /// Wall-clock time served so far. Never negative.
    pub fn time_served(&self, now: DateTime<Utc>) -> Duration {
        (now - self.sentenced_at).max(Duration::zero())
    }
}

#[derive(Debug, Clone)]
pub struct ConvictRepository {
    pool: PgPool,
}

type ConvictRow = (
    String,
    String,
    String,
    Decimal,
    bool,
    i32,
    String,
    DateTime<Utc>,
);

fn convict_from_row(row: ConvictRow) -> Convict {
    let (
        player_id,
        player_name,
        crime_description,
        fine_amount,
        confiscation,
        sentence_years,
        sentenced_by,
        sentenced_at,
    ) = row;
    Convict {
        player_id,
        player_name,
        crime_description,
        fine_amount,
        confiscation,
        sentence_years,
        sentenced_by,
        sentenced_at,
    }
}

const SELECT_COLS: &str = "player_id, player_name, crime_description, fine_amount, \
                           confiscation, sentence_years, sentenced_by, sentenced_at";

impl ConvictRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, convict: &Convict) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO convicts (
                player_id, player_name, crime_description, fine_amount,
                confiscation, sentence_years, sentenced_by, sentenced_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&convict.player_id)
        .bind(&convict.player_name)
        .bind(&convict.crime_description)
        .bind(convict.fine_amount)
        .bind(convict.confiscation)
        .bind(convict.sentence_years)
        .bind(&convict.sentenced_by)
        .bind(convict.sentenced_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_player(&self, player_id: &str) -> Result<Option<Convict>, StoreError> {
        let row: Option<ConvictRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLS} FROM convicts WHERE player_id = $1"
        ))
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(convict_from_row))
    }

    /// All convicts, longest-serving first.
    pub async fn list(&self) -> Result<Vec<Convict>, StoreError> {
        let rows: Vec<ConvictRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLS} FROM convicts ORDER BY sentenced_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(convict_from_row).collect())
    }

    /// Remove a released convict. Returns whether a row was deleted.
    pub async fn delete(&self, player_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM convicts WHERE player_id = $1")
            .bind(player_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_time_served_never_negative() {
        let sentenced_at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let convict = Convict {
            player_id: "88".into(),
            player_name: String::new(),
            crime_description: "smuggling".into(),
            fine_amount: dec!(100),
            confiscation: false,
            sentence_years: 2,
            sentenced_by: "alice".into(),
            sentenced_at,
        };

        assert_eq!(
            convict.time_served(sentenced_at + Duration::minutes(90)),
            Duration::minutes(90)
        );
        assert_eq!(
            convict.time_served(sentenced_at - Duration::seconds(5)),
            Duration::zero()
        );
    }
}
