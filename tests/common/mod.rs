//! Common test utilities

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Setup test database - truncate game tables for a fresh state.
/// Requires DATABASE_URL pointing at a database with the schema applied
/// (migrations/0001_init.sql).
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::query(
        "TRUNCATE TABLE sessions, action_log, good_prices, buildings, convicts, credits, privateers",
    )
    .execute(&pool)
    .await
    .expect("Failed to clean up DB");

    pool
}
