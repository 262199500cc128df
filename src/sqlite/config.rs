use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bb8::{ManageConnection, Pool, PooledConnection};
use tokio::sync::Mutex;

use crate::error::SqlCrudError;

/// A rusqlite connection that can be handed to a blocking thread.
pub type SharedSqliteConnection = Arc<Mutex<rusqlite::Connection>>;

/// Pooled connection checked out for one session.
pub type SqlitePooledConnection = PooledConnection<'static, SqliteManager>;

pub(crate) const MEMORY_PATH: &str = ":memory:";

/// Options for configuring a `SQLite` pool.
#[derive(Debug, Clone)]
pub struct SqliteOptions {
    pub db_path: String,
    pub pool_size: u32,
    pub busy_timeout: Duration,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            db_path,
            pool_size: 8,
            busy_timeout: Duration::from_secs(5),
        }
    }

    #[must_use]
    pub fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size;
        self
    }

    #[must_use]
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    /// Each in-memory connection is its own database, so those pools hold one connection.
    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.db_path.is_empty() || self.db_path == MEMORY_PATH
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn pool_size(mut self, pool_size: u32) -> Self {
        self.opts.pool_size = pool_size;
        self
    }

    #[must_use]
    pub fn busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.opts.busy_timeout = busy_timeout;
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }
}

/// bb8 manager opening rusqlite connections for one database file.
#[derive(Debug, Clone)]
pub struct SqliteManager {
    db_path: String,
    busy_timeout: Duration,
}

impl SqliteManager {
    #[must_use]
    pub fn new(opts: &SqliteOptions) -> Self {
        let db_path = if opts.is_memory() {
            MEMORY_PATH.to_string()
        } else {
            opts.db_path.clone()
        };
        Self {
            db_path,
            busy_timeout: opts.busy_timeout,
        }
    }

    /// Build a pool from this manager. No connection is opened until the first checkout.
    ///
    /// An in-memory database lives and dies with its one connection, so that pool is capped
    /// at one connection with no idle timeout or max lifetime. File-backed pools keep bb8's
    /// reaper, which is spawned on the current tokio runtime.
    ///
    /// # Errors
    /// Returns `SqlCrudError::ConfigError` if the pool size is zero, or if a file-backed pool
    /// is built outside a tokio runtime.
    pub fn build_pool(self, pool_size: u32) -> Result<Pool<SqliteManager>, SqlCrudError> {
        let memory = self.db_path == MEMORY_PATH;
        let pool_size = if memory { 1 } else { pool_size };
        if pool_size == 0 {
            return Err(SqlCrudError::ConfigError(
                "sqlite pool_size must be at least 1".to_string(),
            ));
        }

        let builder = Pool::builder().max_size(pool_size);
        let builder = if memory {
            builder.idle_timeout(None).max_lifetime(None)
        } else {
            if tokio::runtime::Handle::try_current().is_err() {
                return Err(SqlCrudError::ConfigError(format!(
                    "sqlite pool for `{}` must be created inside a tokio runtime",
                    self.db_path
                )));
            }
            builder
        };
        Ok(builder.build_unchecked(self))
    }

    fn open(&self) -> Result<rusqlite::Connection, rusqlite::Error> {
        let conn = rusqlite::Connection::open(&self.db_path)?;
        conn.busy_timeout(self.busy_timeout)?;
        if self.db_path != MEMORY_PATH {
            // journal_mode returns the resulting mode as a row
            conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
        }
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }
}

impl ManageConnection for SqliteManager {
    type Connection = SharedSqliteConnection;
    type Error = rusqlite::Error;

    #[allow(clippy::manual_async_fn)]
    fn connect(&self) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send {
        let opened = self.open().map(|conn| Arc::new(Mutex::new(conn)));
        async move { opened }
    }

    #[allow(clippy::manual_async_fn)]
    fn is_valid(
        &self,
        conn: &mut Self::Connection,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        async move {
            let guard = conn.lock().await;
            guard.execute_batch("SELECT 1;")
        }
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}
