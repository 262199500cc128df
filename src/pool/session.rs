#[cfg(feature = "postgres")]
use deadpool_postgres::Object as PostgresObject;

#[cfg(feature = "sqlite")]
use crate::sqlite::config::SqlitePooledConnection;

use crate::error::SqlCrudError;
use crate::results::ResultSet;
use crate::statement::Statement;

/// Whether a session's statements modify data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// One checked-out connection, scoped to a single facade call.
///
/// Dropping the session returns the connection to its pool on every exit path; a transaction
/// still open at that point is rolled back by the driver.
pub enum Session {
    #[cfg(feature = "postgres")]
    Postgres(PostgresObject),
    #[cfg(feature = "sqlite")]
    Sqlite(SqlitePooledConnection),
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(_) => f.write_str("Session::Postgres"),
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => f.write_str("Session::Sqlite"),
            #[allow(unreachable_patterns)]
            _ => f.write_str("Session"),
        }
    }
}

impl Session {
    /// Execute `statements` in order inside one transaction and collect every returned row.
    ///
    /// # Errors
    /// Propagates the driver's error unchanged; nothing is committed in that case.
    pub async fn run(
        &mut self,
        statements: Vec<Statement>,
        access: Access,
    ) -> Result<ResultSet, SqlCrudError> {
        match self {
            #[cfg(feature = "postgres")]
            Session::Postgres(client) => {
                crate::postgres::query::run_statements(client, &statements).await
            }
            #[cfg(feature = "sqlite")]
            Session::Sqlite(conn) => {
                crate::sqlite::query::run_statements(conn, statements, access).await
            }
            #[allow(unreachable_patterns)]
            _ => {
                let _ = (statements, access);
                Err(SqlCrudError::Unimplemented(
                    "This database type is not enabled in the current build".to_string(),
                ))
            }
        }
    }
}
