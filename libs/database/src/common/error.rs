/// Error type for connection management and health probing
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Errors raised by SeaORM
    #[cfg(feature = "postgres")]
    #[error("Database error: {0}")]
    Orm(#[from] sea_orm::DbErr),

    /// Health check failed
    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),
}

/// Result type alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;
