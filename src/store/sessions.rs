//! Session repository
//!
//! Moderator sessions: a display name bound to a table for the duration of
//! a shift. Logout deactivates; rows are kept for the record.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::Table;

use super::StoreError;

/// One login session.
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: Uuid,
    pub username: String,
    pub table: Table,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a new session for a moderator.
    pub async fn create(&self, username: &str, table: Table) -> Result<Session, StoreError> {
        let session_id = Uuid::new_v4();
        let created_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO sessions (session_id, username, table_code, created_at, is_active)
            VALUES ($1, $2, $3, $4, TRUE)
            "#,
        )
        .bind(session_id)
        .bind(username)
        .bind(table.as_str())
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(Session {
            session_id,
            username: username.to_string(),
            table,
            created_at,
            is_active: true,
        })
    }

    /// Look up an active session by its token.
    pub async fn find_active(&self, session_id: Uuid) -> Result<Option<Session>, StoreError> {
        let row: Option<(Uuid, String, String, DateTime<Utc>, bool)> = sqlx::query_as(
            r#"
            SELECT session_id, username, table_code, created_at, is_active
            FROM sessions
            WHERE session_id = $1 AND is_active = TRUE
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(session_id, username, table_code, created_at, is_active)| {
            let table = Table::parse(&table_code)
                .ok_or_else(|| StoreError::Corrupt(format!("unknown table code {table_code}")))?;
            Ok(Session {
                session_id,
                username,
                table,
                created_at,
                is_active,
            })
        })
        .transpose()
    }

    /// Deactivate a session on logout. Idempotent.
    pub async fn deactivate(&self, session_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE sessions SET is_active = FALSE WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
