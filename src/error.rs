use thiserror::Error;

/// Every failure a facade call can report.
///
/// Driver and pool errors pass through untouched (`#[error(transparent)]`); the remaining
/// variants cover the handful of checks made before a statement reaches the driver.
#[derive(Debug, Error)]
pub enum SqlCrudError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PoolErrorPostgres(#[from] deadpool_postgres::PoolError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error("Row decode error: {0}")]
    DecodeError(String),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),
}

#[cfg(feature = "sqlite")]
impl From<bb8::RunError<rusqlite::Error>> for SqlCrudError {
    fn from(err: bb8::RunError<rusqlite::Error>) -> Self {
        match err {
            bb8::RunError::User(e) => SqlCrudError::SqliteError(e),
            bb8::RunError::TimedOut => {
                SqlCrudError::ConnectionError("SQLite pool checkout timed out".to_string())
            }
        }
    }
}

pub type Result<T, E = SqlCrudError> = std::result::Result<T, E>;
