//! PostgreSQL connection management, migrations and health checks.
//!
//! The helpers only depend on SeaORM's generic connection type, so the same
//! functions serve the SQLite databases used by the test suites.

mod config;
mod connector;
mod health;

pub use config::PostgresConfig;
pub use connector::{connect_from_config, connect_from_config_with_retry, run_migrations};
pub use health::check_health;

pub use sea_orm::{ConnectOptions, DatabaseConnection, DbErr};
pub use sea_orm_migration::MigratorTrait;
