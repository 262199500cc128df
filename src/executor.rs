use crate::entity::{Entity, TableDef};
use crate::error::SqlCrudError;
use crate::pool::{Access, SessionFactory};
use crate::predicate::Predicate;
use crate::results::ResultSet;
use crate::statement::{self, Statement};
use crate::types::{Dialect, ValueMap};

/// Runs the canonical statement shapes for an [`Entity`], one session per call.
///
/// Each call checks out a session, runs its statement(s) inside a single transaction,
/// commits, and maps every returned row through [`Entity::from_row`]. The session is
/// released when the call returns, errors, or is cancelled.
#[derive(Clone, Debug)]
pub struct QueryExecutor {
    factory: SessionFactory,
}

impl QueryExecutor {
    #[must_use]
    pub fn new(factory: SessionFactory) -> Self {
        Self { factory }
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.factory.dialect()
    }

    #[must_use]
    pub fn session_factory(&self) -> &SessionFactory {
        &self.factory
    }

    /// All rows of `E`'s table, optionally filtered.
    ///
    /// # Errors
    /// Returns pool, driver, or decode errors.
    pub async fn select<E: Entity>(
        &self,
        predicate: Option<&Predicate>,
    ) -> Result<Vec<E>, SqlCrudError> {
        let stmt = statement::select(E::table(), self.dialect(), predicate);
        self.fetch(vec![stmt], Access::Read).await
    }

    /// Insert one row per map and return the stored rows, server defaults included.
    ///
    /// Maps may carry different column sets; consecutive maps with the same columns share one
    /// multi-row statement, and all statements run in one transaction in the order given.
    /// An empty slice returns an empty vector without touching the database.
    ///
    /// # Errors
    /// Returns `ParameterError` for unknown columns, otherwise pool, driver, or decode errors.
    pub async fn insert<E: Entity>(&self, rows: &[ValueMap]) -> Result<Vec<E>, SqlCrudError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let table = E::table();
        for row in rows {
            check_columns(table, row)?;
        }
        let statements = statement::insert(table, self.dialect(), rows);
        self.fetch(statements, Access::Write).await
    }

    /// Set `values` on every row matching `predicate`; returns the rows after the update.
    ///
    /// # Errors
    /// Returns `ParameterError` for an empty or unknown column set, otherwise pool, driver,
    /// or decode errors.
    pub async fn update<E: Entity>(
        &self,
        predicate: &Predicate,
        values: &ValueMap,
    ) -> Result<Vec<E>, SqlCrudError> {
        let table = E::table();
        check_columns(table, values)?;
        let stmt = statement::update(table, self.dialect(), predicate, values)?;
        self.fetch(vec![stmt], Access::Write).await
    }

    /// Update each row identified by the primary-key fields of its map.
    ///
    /// All maps are applied in one transaction; if any statement fails none are kept.
    ///
    /// # Errors
    /// Returns `ParameterError` when a map lacks a key column, has nothing else to set, or
    /// names an unknown column; otherwise pool, driver, or decode errors.
    pub async fn update_by_primary_key<E: Entity>(
        &self,
        rows: &[ValueMap],
    ) -> Result<Vec<E>, SqlCrudError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let table = E::table();
        for row in rows {
            check_columns(table, row)?;
        }
        let statements = statement::update_by_primary_key(table, self.dialect(), rows)?;
        self.fetch(statements, Access::Write).await
    }

    /// Delete every row matching `predicate`; returns the rows as they were before deletion.
    ///
    /// # Errors
    /// Returns pool, driver, or decode errors.
    pub async fn delete<E: Entity>(&self, predicate: &Predicate) -> Result<Vec<E>, SqlCrudError> {
        let stmt = statement::delete(E::table(), self.dialect(), predicate);
        self.fetch(vec![stmt], Access::Write).await
    }

    /// `CREATE TABLE IF NOT EXISTS` for `E`.
    ///
    /// # Errors
    /// Returns pool or driver errors.
    pub async fn create_all<E: Entity>(&self) -> Result<(), SqlCrudError> {
        let stmt = statement::create_table(E::table(), self.dialect());
        self.run(vec![stmt], Access::Write).await.map(|_| ())
    }

    /// `DROP TABLE IF EXISTS` for `E`.
    ///
    /// # Errors
    /// Returns pool or driver errors.
    pub async fn drop_all<E: Entity>(&self) -> Result<(), SqlCrudError> {
        let stmt = statement::drop_table(E::table(), self.dialect());
        self.run(vec![stmt], Access::Write).await.map(|_| ())
    }

    async fn fetch<E: Entity>(
        &self,
        statements: Vec<Statement>,
        access: Access,
    ) -> Result<Vec<E>, SqlCrudError> {
        let result_set = self.run(statements, access).await?;
        let entities = result_set
            .results
            .iter()
            .map(E::from_row)
            .collect::<Result<Vec<E>, _>>()?;
        tracing::debug!(table = E::table().name, rows = entities.len(), "rows returned");
        Ok(entities)
    }

    async fn run(
        &self,
        statements: Vec<Statement>,
        access: Access,
    ) -> Result<ResultSet, SqlCrudError> {
        let mut session = self.factory.session().await?;
        session.run(statements, access).await
    }
}

fn check_columns(table: &TableDef, values: &ValueMap) -> Result<(), SqlCrudError> {
    match values.keys().find(|name| table.column(name).is_none()) {
        Some(name) => Err(SqlCrudError::ParameterError(format!(
            "`{}` has no column `{name}`",
            table.name
        ))),
        None => Ok(()),
    }
}
