//! Action Log Service
//!
//! Every moderator action lands in one append-only table: who did it, at
//! which table, what kind of action, which player it concerned, and a
//! free-form detail payload. Entries are hash-chained for tamper evidence
//! and the chain can be verified after the game.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{ModeratorContext, Table};

/// One persisted log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub id: Uuid,
    pub sequence_number: i64,
    pub author: String,
    pub table: String,
    pub action: String,
    pub player_id: Option<String>,
    pub details: serde_json::Value,
    pub correlation_id: Option<Uuid>,
    pub previous_hash: String,
    pub current_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Every kind of action a moderator can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Deal,
    Court,
    Release,
    Purchase,
    Building,
    Processing,
    Profit,
    Demolition,
    Sale,
    ShipDeal,
    FactoryWork,
    CreditIssue,
    CreditPayment,
    CoalPurchase,
    PrivateerLicense,
    PrivateerShip,
    PrivateerComplaint,
    PrivateerPayment,
    QuestAccept,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Deal => "deal",
            ActionKind::Court => "court",
            ActionKind::Release => "release",
            ActionKind::Purchase => "purchase",
            ActionKind::Building => "building",
            ActionKind::Processing => "processing",
            ActionKind::Profit => "profit",
            ActionKind::Demolition => "demolition",
            ActionKind::Sale => "sale",
            ActionKind::ShipDeal => "ship_deal",
            ActionKind::FactoryWork => "factory_work",
            ActionKind::CreditIssue => "credit_issue",
            ActionKind::CreditPayment => "credit_payment",
            ActionKind::CoalPurchase => "coal_purchase",
            ActionKind::PrivateerLicense => "privateer_license",
            ActionKind::PrivateerShip => "privateer_ship",
            ActionKind::PrivateerComplaint => "privateer_complaint",
            ActionKind::PrivateerPayment => "privateer_payment",
            ActionKind::QuestAccept => "quest_accept",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Builder for one log entry's action-specific payload.
#[derive(Debug, Clone)]
pub struct ActionLogBuilder {
    action: String,
    player_id: Option<String>,
    details: serde_json::Map<String, serde_json::Value>,
}

impl ActionLogBuilder {
    pub fn new(action: ActionKind) -> Self {
        Self {
            action: action.as_str().to_string(),
            player_id: None,
            details: serde_json::Map::new(),
        }
    }

    /// Subject player this action concerns.
    pub fn player(mut self, player_id: impl Into<String>) -> Self {
        self.player_id = Some(player_id.into());
        self
    }

    /// Add one key/value to the detail payload.
    pub fn detail(mut self, key: &str, value: impl Serialize) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.details.insert(key.to_string(), value);
        }
        self
    }
}

/// Filters for the transaction-list view.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub table: Option<Table>,
    pub action: Option<String>,
    pub player_id: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub limit: i64,
    pub offset: i64,
}

/// Action Log Service
#[derive(Debug, Clone)]
pub struct ActionLogService {
    pool: PgPool,
}

impl ActionLogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one entry, extending the hash chain.
    ///
    /// The previous entry is read and the new hash computed inside one
    /// transaction so the chain stays linear under interleaved writers.
    pub async fn log(
        &self,
        builder: ActionLogBuilder,
        context: &ModeratorContext,
    ) -> Result<Uuid, ActionLogError> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();
        let details = serde_json::Value::Object(builder.details);

        let mut tx = self.pool.begin().await?;

        let tail: Option<(i64, String)> = sqlx::query_as(
            r#"
            SELECT sequence_number, current_hash
            FROM action_log
            ORDER BY sequence_number DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .fetch_optional(&mut *tx)
        .await?;

        let (sequence_number, previous_hash) = match tail {
            Some((seq, hash)) => (seq + 1, hash),
            None => (1, GENESIS_HASH.to_string()),
        };

        let hash_input = format!(
            "{}{}{}{}{}{}{}{}",
            id,
            sequence_number,
            builder.action,
            context.author,
            context.table,
            builder.player_id.as_deref().unwrap_or_default(),
            details,
            previous_hash
        );
        let current_hash = sha256_hex(&hash_input);

        sqlx::query(
            r#"
            INSERT INTO action_log (
                id, sequence_number, author, table_code, action, player_id,
                details, correlation_id, previous_hash, current_hash, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(id)
        .bind(sequence_number)
        .bind(&context.author)
        .bind(context.table.as_str())
        .bind(&builder.action)
        .bind(&builder.player_id)
        .bind(&details)
        .bind(context.correlation_id)
        .bind(&previous_hash)
        .bind(&current_hash)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            log_id = %id,
            action = %builder.action,
            author = %context.author,
            "Action log entry created"
        );

        Ok(id)
    }

    /// Verify the integrity of the log hash chain.
    pub async fn verify_hash_chain(
        &self,
        limit: Option<i64>,
    ) -> Result<ChainVerificationResult, ActionLogError> {
        let limit = limit.unwrap_or(1000);

        let entries: Vec<(Uuid, i64, String, String, String, Option<String>, serde_json::Value, String, String)> =
            sqlx::query_as(
                r#"
                SELECT id, sequence_number, author, table_code, action, player_id,
                       details, previous_hash, current_hash
                FROM action_log
                ORDER BY sequence_number ASC
                LIMIT $1
                "#,
            )
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let mut previous_hash = GENESIS_HASH.to_string();

        for (id, seq, author, table, action, player_id, details, prev_hash, current_hash) in
            &entries
        {
            if prev_hash != &previous_hash {
                return Ok(ChainVerificationResult {
                    is_valid: false,
                    entries_checked: *seq as u64,
                    first_invalid_entry: Some(*id),
                    expected_hash: Some(previous_hash),
                    actual_hash: Some(prev_hash.clone()),
                });
            }

            let hash_input = format!(
                "{}{}{}{}{}{}{}{}",
                id,
                seq,
                action,
                author,
                table,
                player_id.as_deref().unwrap_or_default(),
                details,
                prev_hash
            );
            let calculated_hash = sha256_hex(&hash_input);

            if &calculated_hash != current_hash {
                return Ok(ChainVerificationResult {
                    is_valid: false,
                    entries_checked: *seq as u64,
                    first_invalid_entry: Some(*id),
                    expected_hash: Some(calculated_hash),
                    actual_hash: Some(current_hash.clone()),
                });
            }

            previous_hash = current_hash.clone();
        }

        Ok(ChainVerificationResult {
            is_valid: true,
            entries_checked: entries.len() as u64,
            first_invalid_entry: None,
            expected_hash: None,
            actual_hash: None,
        })
    }

    /// Filtered, paginated slice of the log (newest first).
    pub async fn query(&self, filter: &LogFilter) -> Result<Vec<ActionLogEntry>, ActionLogError> {
        let limit = if filter.limit > 0 { filter.limit } else { 20 };

        let entries: Vec<LogRow> = sqlx::query_as(
            r#"
            SELECT id, sequence_number, author, table_code, action, player_id,
                   details, correlation_id, previous_hash, current_hash, created_at
            FROM action_log
            WHERE ($1::text IS NULL OR table_code = $1)
              AND ($2::text IS NULL OR action = $2)
              AND ($3::text IS NULL OR player_id = $3)
              AND ($4::timestamptz IS NULL OR created_at >= $4)
              AND ($5::timestamptz IS NULL OR created_at <= $5)
            ORDER BY sequence_number DESC
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(filter.table.map(|t| t.as_str()))
        .bind(&filter.action)
        .bind(&filter.player_id)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries.into_iter().map(ActionLogEntry::from).collect())
    }

    /// Single entry by id.
    pub async fn get(&self, id: Uuid) -> Result<Option<ActionLogEntry>, ActionLogError> {
        let row: Option<LogRow> = sqlx::query_as(
            r#"
            SELECT id, sequence_number, author, table_code, action, player_id,
                   details, correlation_id, previous_hash, current_hash, created_at
            FROM action_log
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ActionLogEntry::from))
    }

    /// All of one player's entries (newest first).
    pub async fn get_by_player(
        &self,
        player_id: &str,
        limit: i64,
    ) -> Result<Vec<ActionLogEntry>, ActionLogError> {
        let filter = LogFilter {
            player_id: Some(player_id.to_string()),
            limit,
            ..LogFilter::default()
        };
        self.query(&filter).await
    }

    /// Action counts grouped by kind, for the statistics screen.
    pub async fn count_by_action(
        &self,
        table: Option<Table>,
        since: DateTime<Utc>,
    ) -> Result<Vec<(String, i64)>, ActionLogError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT action, COUNT(*)
            FROM action_log
            WHERE created_at >= $1
              AND ($2::text IS NULL OR table_code = $2)
            GROUP BY action
            ORDER BY COUNT(*) DESC
            "#,
        )
        .bind(since)
        .bind(table.map(|t| t.as_str()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Entry counts grouped by calendar day.
    pub async fn count_by_day(
        &self,
        table: Option<Table>,
        since: DateTime<Utc>,
    ) -> Result<Vec<(NaiveDate, i64)>, ActionLogError> {
        let rows: Vec<(NaiveDate, i64)> = sqlx::query_as(
            r#"
            SELECT created_at::date AS day, COUNT(*)
            FROM action_log
            WHERE created_at >= $1
              AND ($2::text IS NULL OR table_code = $2)
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(since)
        .bind(table.map(|t| t.as_str()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

type LogRow = (
    Uuid,
    i64,
    String,
    String,
    String,
    Option<String>,
    serde_json::Value,
    Option<Uuid>,
    String,
    String,
    DateTime<Utc>,
);

impl From<LogRow> for ActionLogEntry {
    fn from(row: LogRow) -> Self {
        let (
            id,
            sequence_number,
            author,
            table,
            action,
            player_id,
            details,
            correlation_id,
            previous_hash,
            current_hash,
            created_at,
        ) = row;
        ActionLogEntry {
            id,
            sequence_number,
            author,
            table,
            action,
            player_id,
            details,
            correlation_id,
            previous_hash,
            current_hash,
            created_at,
        }
    }
}

/// Result of hash chain verification
#[derive(Debug, Clone, Serialize)]
pub struct ChainVerificationResult {
    pub is_valid: bool,
    pub entries_checked: u64,
    pub first_invalid_entry: Option<Uuid>,
    pub expected_hash: Option<String>,
    pub actual_hash: Option<String>,
}

const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Calculate SHA-256 hash and return as hex string
fn sha256_hex(input: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Action log errors
#[derive(Debug, thiserror::Error)]
pub enum ActionLogError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_kind_as_str() {
        assert_eq!(ActionKind::Sale.as_str(), "sale");
        assert_eq!(ActionKind::CreditPayment.as_str(), "credit_payment");
        assert_eq!(ActionKind::PrivateerComplaint.as_str(), "privateer_complaint");
    }

    #[test]
    fn test_action_log_builder() {
        let builder = ActionLogBuilder::new(ActionKind::Sale)
            .player("4217")
            .detail("good", "cloth")
            .detail("quantity", 7)
            .detail("total", "140.00");

        assert_eq!(builder.action, "sale");
        assert_eq!(builder.player_id, Some("4217".to_string()));
        assert_eq!(builder.details.len(), 3);
        assert_eq!(builder.details["quantity"], serde_json::json!(7));
    }

    #[test]
    fn test_sha256_hex() {
        let hash = sha256_hex("test input");
        assert_eq!(hash.len(), 64);
        // Stable for identical input
        assert_eq!(hash, sha256_hex("test input"));
    }

    #[test]
    fn test_genesis_hash_shape() {
        assert_eq!(GENESIS_HASH.len(), 64);
        assert!(GENESIS_HASH.chars().all(|c| c == '0'));
    }
}
