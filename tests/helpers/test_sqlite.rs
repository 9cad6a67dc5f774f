use std::str::FromStr;

use relaychat::infrastructure::persistence::{SqliteConversationRepository, run_migrations};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// In-memory database; a single connection that is never recycled keeps the schema alive.
pub struct TestSqlite {
    pub pool: SqlitePool,
    pub conversation_repository: SqliteConversationRepository,
}

impl TestSqlite {
    pub async fn new() -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("Invalid SQLite URL")
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .expect("Failed to open in-memory SQLite");

        run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        Self {
            conversation_repository: SqliteConversationRepository::new(pool.clone()),
            pool,
        }
    }
}
