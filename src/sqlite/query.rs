use std::sync::Arc;

use rusqlite::TransactionBehavior;
use rusqlite::types::Value;
use tokio::task::spawn_blocking;

use super::config::{SharedSqliteConnection, SqlitePooledConnection};
use super::params::Params;
use crate::error::SqlCrudError;
use crate::pool::Access;
use crate::results::ResultSet;
use crate::statement::Statement;
use crate::types::RowValues;

/// Extract a `RowValues` from a `SQLite` row.
///
/// # Errors
///
/// Returns `SqlCrudError` if the value cannot be read.
pub fn sqlite_extract_value_sync(
    row: &rusqlite::Row,
    idx: usize,
) -> Result<RowValues, SqlCrudError> {
    let value: Value = row.get(idx)?;
    Ok(match value {
        Value::Null => RowValues::Null,
        Value::Integer(i) => RowValues::Int(i),
        Value::Real(f) => RowValues::Float(f),
        Value::Text(s) => RowValues::Text(s),
        Value::Blob(b) => RowValues::Blob(b),
    })
}

/// Step a prepared statement to completion and collect every row.
///
/// # Errors
/// Returns `SqlCrudError::SqliteError` if execution or value extraction fails.
pub fn build_result_set(
    stmt: &mut rusqlite::Statement<'_>,
    params: &[Value],
) -> Result<ResultSet, SqlCrudError> {
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let col_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(Arc::new(column_names));

    let param_refs: Vec<&dyn rusqlite::ToSql> =
        params.iter().map(|v| v as &dyn rusqlite::ToSql).collect();
    let mut rows_iter = stmt.query(&param_refs[..])?;
    while let Some(row) = rows_iter.next()? {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(sqlite_extract_value_sync(row, i)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

/// Run `statements` in one transaction on the session's connection.
///
/// Writes take the lock up front (`BEGIN IMMEDIATE`) so concurrent writers wait on the busy
/// timeout instead of failing when a deferred transaction upgrades.
///
/// # Errors
/// Returns the first rusqlite error; the transaction is rolled back when dropped.
pub(crate) async fn run_statements(
    conn: &SqlitePooledConnection,
    statements: Vec<Statement>,
    access: Access,
) -> Result<ResultSet, SqlCrudError> {
    let handle = Arc::clone(&**conn);
    run_blocking(handle, move |raw| {
        let behavior = match access {
            Access::Read => TransactionBehavior::Deferred,
            Access::Write => TransactionBehavior::Immediate,
        };
        let tx = raw.transaction_with_behavior(behavior)?;
        let mut all = ResultSet::default();
        for stmt in &statements {
            tracing::debug!(sql = %stmt.sql, params = stmt.params.len(), "sqlite statement");
            let params = Params::convert(&stmt.params);
            let mut prepared = tx.prepare(&stmt.sql)?;
            if stmt.returns_rows {
                all.extend(build_result_set(&mut prepared, params.as_values())?);
            } else {
                prepared.execute(&params.as_refs()[..])?;
            }
        }
        tx.commit()?;
        Ok(all)
    })
    .await
}

async fn run_blocking<F, R>(conn: SharedSqliteConnection, func: F) -> Result<R, SqlCrudError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqlCrudError> + Send + 'static,
    R: Send + 'static,
{
    spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await
    .map_err(|e| SqlCrudError::ConnectionError(format!("sqlite spawn_blocking join error: {e}")))?
}
