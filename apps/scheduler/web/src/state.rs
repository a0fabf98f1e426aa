//! Application state management.

/// Shared application state.
///
/// Cloned into the readiness router and moved into the shutdown cleanup.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// Database connection pool
    pub db: database::postgres::DatabaseConnection,
}
