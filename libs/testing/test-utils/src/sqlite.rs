//! SQLite test infrastructure
//!
//! `TestDatabase` opens a private in-memory SQLite database and applies the
//! workspace migrations, so repository tests run against the real schema
//! without any external service.

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};

/// Test database wrapper
///
/// Each instance owns its own database; it disappears when the last
/// connection handle is dropped.
pub struct TestDatabase {
    pub connection: DatabaseConnection,
}

impl TestDatabase {
    /// Create a new test database with migrations applied
    ///
    /// ```no_run
    /// use test_utils::TestDatabase;
    ///
    /// # async fn example() {
    /// let db = TestDatabase::new().await;
    /// // Use db.connection() to create your repository
    /// # }
    /// ```
    pub async fn new() -> Self {
        // A single pooled connection: each in-memory connection is its own database.
        let mut options = ConnectOptions::new("sqlite::memory:");
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let connection = Database::connect(options)
            .await
            .expect("Failed to open in-memory SQLite database");

        connection
            .execute_unprepared("PRAGMA foreign_keys = ON")
            .await
            .expect("Failed to enable foreign keys");

        Migrator::up(&connection, None)
            .await
            .expect("Failed to apply migrations");

        tracing::debug!("Test database ready (SQLite in-memory)");

        Self { connection }
    }

    /// Get a handle to the database connection
    pub fn connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }
}
