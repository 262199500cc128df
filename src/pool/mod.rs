pub mod session;

pub use session::{Access, Session};

#[cfg(feature = "postgres")]
use deadpool_postgres::Pool as DeadpoolPostgresPool;

#[cfg(feature = "sqlite")]
use crate::sqlite::SqliteManager;

use crate::error::SqlCrudError;
use crate::types::Dialect;

/// Connection pool for database access
///
/// This enum wraps the pool types of the supported backends.
#[derive(Clone)]
pub enum CrudPool {
    /// `PostgreSQL` connection pool
    #[cfg(feature = "postgres")]
    Postgres(DeadpoolPostgresPool),
    /// `SQLite` connection pool
    #[cfg(feature = "sqlite")]
    Sqlite(bb8::Pool<SqliteManager>),
}

// Manual Debug implementation because bb8::Pool only prints its state
impl std::fmt::Debug for CrudPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(pool) => f.debug_tuple("Postgres").field(&pool.status()).finish(),
            #[cfg(feature = "sqlite")]
            Self::Sqlite(pool) => f.debug_tuple("Sqlite").field(&pool.state()).finish(),
            #[allow(unreachable_patterns)]
            _ => f.write_str("CrudPool"),
        }
    }
}

/// Long-lived factory handing out one [`Session`] per facade call.
///
/// Cloning is cheap and shares the underlying pool.
#[derive(Clone, Debug)]
pub struct SessionFactory {
    pool: CrudPool,
    dialect: Dialect,
}

impl SessionFactory {
    #[must_use]
    pub fn new(pool: CrudPool, dialect: Dialect) -> Self {
        Self { pool, dialect }
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    #[must_use]
    pub fn pool(&self) -> &CrudPool {
        &self.pool
    }

    /// Check a connection out of the pool.
    ///
    /// # Errors
    /// Returns the pool's checkout error (`PoolErrorPostgres`, `SqliteError`, or
    /// `ConnectionError` on timeout).
    pub async fn session(&self) -> Result<Session, SqlCrudError> {
        tracing::trace!(dialect = ?self.dialect, "checking out session");
        match &self.pool {
            #[cfg(feature = "postgres")]
            CrudPool::Postgres(pool) => Ok(Session::Postgres(pool.get().await?)),
            #[cfg(feature = "sqlite")]
            CrudPool::Sqlite(pool) => Ok(Session::Sqlite(pool.get_owned().await?)),
            #[allow(unreachable_patterns)]
            _ => Err(SqlCrudError::Unimplemented(
                "This database type is not enabled in the current build".to_string(),
            )),
        }
    }
}
