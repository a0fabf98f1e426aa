//! Schema CLI for the scheduler's `locations` and `tasks` tables.
//!
//! Reads `DATABASE_URL`; `up`, `down`, `status`, `fresh` and `refresh` come
//! from sea-orm-migration.

use migration::Migrator;
use sea_orm_migration::cli;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
