//! SeaORM entities for the `tasks` and `locations` tables.

pub mod location;
pub mod task;
