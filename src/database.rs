use std::fmt;

use crate::config::{ConnectionDescriptor, ConnectionUrl};
use crate::entity::Entity;
use crate::error::SqlCrudError;
use crate::executor::QueryExecutor;
use crate::pool::{CrudPool, SessionFactory};
use crate::predicate::Predicate;
use crate::types::{Dialect, ValueMap};

#[cfg(feature = "sqlite")]
use crate::sqlite::{SqliteManager, SqliteOptions};

const DEFAULT_POOL_SIZE: u32 = 16;

/// Handle to one database: the connection details plus a pooled session factory.
///
/// Construction parses the connection URL and sets up the pool, but opens no connection;
/// the first operation does. Cloning shares the pool.
///
/// ```rust,no_run
/// use sql_crud::prelude::*;
///
/// # async fn demo() -> Result<(), SqlCrudError> {
/// let db = Database::new(ConnectionDescriptor::new("app", "secret").database_name("notes"))?;
/// let recent: Vec<Note> = db.select(Some(&col("id").gt(10))).await?;
/// # let _ = recent;
/// # Ok(())
/// # }
/// # struct Note;
/// # static NOTES: TableDef = TableDef::new("notes", &[ColumnDef::new("id", SqlType::Integer)]);
/// # impl Entity for Note {
/// #     fn table() -> &'static TableDef { &NOTES }
/// #     fn from_row(_: &DbRow) -> Result<Self, SqlCrudError> { Ok(Note) }
/// # }
/// ```
#[derive(Clone)]
pub struct Database {
    descriptor: Option<ConnectionDescriptor>,
    url: ConnectionUrl,
    executor: QueryExecutor,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("url", &self.url)
            .field("pool", self.executor.session_factory().pool())
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Build the connection URL from `descriptor` and set up the session factory.
    ///
    /// File-backed `SQLite` handles must be built inside a tokio runtime (see
    /// [`Database::sqlite`]).
    ///
    /// # Errors
    /// Returns `SqlCrudError::ConfigError` when the URL cannot be built, the driver rejects
    /// it, or a file-backed `SQLite` pool is built outside a runtime, and `Unimplemented`
    /// when the dialect's backend is not compiled in.
    pub fn new(descriptor: ConnectionDescriptor) -> Result<Self, SqlCrudError> {
        let url = ConnectionUrl::parse(&descriptor.connection_url()?)?;
        let pool = build_pool(&url, descriptor.pool_size)?;
        Ok(Self::assemble(Some(descriptor), url, pool))
    }

    /// Same as [`Database::new`] but from a ready-made connection URL.
    ///
    /// # Errors
    /// Returns `SqlCrudError::ConfigError` for an unparseable URL.
    pub fn from_url(url: &str) -> Result<Self, SqlCrudError> {
        let url = ConnectionUrl::parse(url)?;
        let pool = build_pool(&url, DEFAULT_POOL_SIZE)?;
        Ok(Self::assemble(None, url, pool))
    }

    /// File-backed (or in-memory) `SQLite` database.
    ///
    /// A file-backed handle must be built from within a tokio runtime, where the bb8 pool
    /// schedules its reaper task. In-memory handles spawn nothing.
    ///
    /// # Errors
    /// Returns `SqlCrudError::ConfigError` if the pool size is zero or a file-backed handle
    /// is built outside a runtime.
    #[cfg(feature = "sqlite")]
    pub fn sqlite(options: SqliteOptions) -> Result<Self, SqlCrudError> {
        let descriptor = ConnectionDescriptor::new("", "")
            .dialect(Dialect::Sqlite)
            .database_name(options.db_path.clone())
            .pool_size(options.pool_size);
        let url = ConnectionUrl::parse(&descriptor.connection_url()?)?;
        let pool = CrudPool::Sqlite(SqliteManager::new(&options).build_pool(options.pool_size)?);
        Ok(Self::assemble(Some(descriptor), url, pool))
    }

    fn assemble(descriptor: Option<ConnectionDescriptor>, url: ConnectionUrl, pool: CrudPool) -> Self {
        tracing::debug!(url = %url, "database handle created");
        let executor = QueryExecutor::new(SessionFactory::new(pool, url.dialect));
        Self {
            descriptor,
            url,
            executor,
        }
    }

    /// The connection URL; its `Display` and `Debug` output hide the password.
    #[must_use]
    pub fn url(&self) -> &ConnectionUrl {
        &self.url
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.url.dialect
    }

    /// The descriptor this handle was built from; `None` for [`Database::from_url`].
    #[must_use]
    pub fn descriptor(&self) -> Option<&ConnectionDescriptor> {
        self.descriptor.as_ref()
    }

    #[must_use]
    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    /// See [`QueryExecutor::select`].
    ///
    /// # Errors
    /// Returns pool, driver, or decode errors.
    pub async fn select<E: Entity>(
        &self,
        predicate: Option<&Predicate>,
    ) -> Result<Vec<E>, SqlCrudError> {
        self.executor.select(predicate).await
    }

    /// See [`QueryExecutor::insert`].
    ///
    /// # Errors
    /// Returns `ParameterError` for unknown columns, otherwise pool, driver, or decode errors.
    pub async fn insert<E: Entity>(&self, rows: &[ValueMap]) -> Result<Vec<E>, SqlCrudError> {
        self.executor.insert(rows).await
    }

    /// See [`QueryExecutor::update`].
    ///
    /// # Errors
    /// Returns `ParameterError` for an empty value map, otherwise pool, driver, or decode errors.
    pub async fn update<E: Entity>(
        &self,
        predicate: &Predicate,
        values: &ValueMap,
    ) -> Result<Vec<E>, SqlCrudError> {
        self.executor.update(predicate, values).await
    }

    /// See [`QueryExecutor::update_by_primary_key`].
    ///
    /// # Errors
    /// Returns `ParameterError` when a map lacks a key column, otherwise pool, driver, or
    /// decode errors.
    pub async fn update_by_primary_key<E: Entity>(
        &self,
        rows: &[ValueMap],
    ) -> Result<Vec<E>, SqlCrudError> {
        self.executor.update_by_primary_key(rows).await
    }

    /// See [`QueryExecutor::delete`].
    ///
    /// # Errors
    /// Returns pool, driver, or decode errors.
    pub async fn delete<E: Entity>(&self, predicate: &Predicate) -> Result<Vec<E>, SqlCrudError> {
        self.executor.delete(predicate).await
    }

    /// See [`QueryExecutor::create_all`].
    ///
    /// # Errors
    /// Returns pool or driver errors.
    pub async fn create_all<E: Entity>(&self) -> Result<(), SqlCrudError> {
        self.executor.create_all::<E>().await
    }

    /// See [`QueryExecutor::drop_all`].
    ///
    /// # Errors
    /// Returns pool or driver errors.
    pub async fn drop_all<E: Entity>(&self) -> Result<(), SqlCrudError> {
        self.executor.drop_all::<E>().await
    }
}

fn build_pool(url: &ConnectionUrl, pool_size: u32) -> Result<CrudPool, SqlCrudError> {
    match url.dialect {
        #[cfg(feature = "postgres")]
        Dialect::Postgres => Ok(CrudPool::Postgres(crate::postgres::create_pool(
            &url.target,
            pool_size as usize,
        )?)),
        #[cfg(feature = "sqlite")]
        Dialect::Sqlite => {
            let options = SqliteOptions::new(url.target.clone()).with_pool_size(pool_size);
            Ok(CrudPool::Sqlite(
                SqliteManager::new(&options).build_pool(pool_size)?,
            ))
        }
        #[allow(unreachable_patterns)]
        other => {
            let _ = pool_size;
            Err(SqlCrudError::Unimplemented(format!(
                "{other:?} support is not enabled in the current build"
            )))
        }
    }
}
