use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use deadpool_postgres::Object;
use serde_json::Value;
use tokio_postgres::types::{FromSql, Type};

use super::params::Params;
use crate::error::SqlCrudError;
use crate::results::ResultSet;
use crate::statement::Statement;
use crate::types::RowValues;

/// Extracts a `RowValues` from a `tokio_postgres` Row at the given index.
///
/// # Errors
/// Returns `SqlCrudError` if the column cannot be retrieved, or `DecodeError` for a column
/// type with no `RowValues` mapping (e.g. `numeric`, `uuid`); cast those in SQL.
pub fn postgres_extract_value(
    row: &tokio_postgres::Row,
    idx: usize,
) -> Result<RowValues, SqlCrudError> {
    let type_info = row.columns()[idx].type_();

    // Text-like types (text, varchar, bpchar, name, citext) fall through to `Text`.
    let value = match type_info.name() {
        "int2" => {
            let val: Option<i16> = row.try_get(idx)?;
            val.map_or(RowValues::Null, |v| RowValues::Int(i64::from(v)))
        }
        "int4" => {
            let val: Option<i32> = row.try_get(idx)?;
            val.map_or(RowValues::Null, |v| RowValues::Int(i64::from(v)))
        }
        "int8" => {
            let val: Option<i64> = row.try_get(idx)?;
            val.map_or(RowValues::Null, RowValues::Int)
        }
        "float4" => {
            let val: Option<f32> = row.try_get(idx)?;
            val.map_or(RowValues::Null, |v| RowValues::Float(f64::from(v)))
        }
        "float8" => {
            let val: Option<f64> = row.try_get(idx)?;
            val.map_or(RowValues::Null, RowValues::Float)
        }
        "bool" => {
            let val: Option<bool> = row.try_get(idx)?;
            val.map_or(RowValues::Null, RowValues::Bool)
        }
        "timestamp" => {
            let val: Option<NaiveDateTime> = row.try_get(idx)?;
            val.map_or(RowValues::Null, RowValues::Timestamp)
        }
        "timestamptz" => {
            let val: Option<DateTime<Utc>> = row.try_get(idx)?;
            val.map_or(RowValues::Null, |v| RowValues::Timestamp(v.naive_utc()))
        }
        "date" => {
            let val: Option<NaiveDate> = row.try_get(idx)?;
            val.map_or(RowValues::Null, |v| {
                RowValues::Text(v.format("%Y-%m-%d").to_string())
            })
        }
        "json" | "jsonb" => {
            let val: Option<Value> = row.try_get(idx)?;
            val.map_or(RowValues::Null, RowValues::JSON)
        }
        "bytea" => {
            let val: Option<Vec<u8>> = row.try_get(idx)?;
            val.map_or(RowValues::Null, RowValues::Blob)
        }
        _ if reads_as_text(type_info) => {
            let val: Option<String> = row.try_get(idx)?;
            val.map_or(RowValues::Null, RowValues::Text)
        }
        other => {
            return Err(SqlCrudError::DecodeError(format!(
                "column `{}` has unsupported postgres type `{other}`",
                row.columns()[idx].name()
            )));
        }
    };
    Ok(value)
}

fn reads_as_text(ty: &Type) -> bool {
    <String as FromSql>::accepts(ty)
}

/// Build a result set from raw Postgres rows.
///
/// # Errors
/// Returns errors from row value extraction.
pub fn build_result_set_from_rows(
    rows: &[tokio_postgres::Row],
) -> Result<ResultSet, SqlCrudError> {
    let mut result_set = ResultSet::with_capacity(rows.len());
    if let Some(row) = rows.first() {
        let cols: Vec<String> = row.columns().iter().map(|c| c.name().to_string()).collect();
        result_set.set_column_names(Arc::new(cols));
    }

    for row in rows {
        let col_count = row.columns().len();
        let mut row_values = Vec::with_capacity(col_count);
        for idx in 0..col_count {
            row_values.push(postgres_extract_value(row, idx)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

/// Run `statements` in one transaction on the session's client.
///
/// # Errors
/// Returns the first tokio-postgres error; the transaction rolls back when dropped.
pub(crate) async fn run_statements(
    client: &mut Object,
    statements: &[Statement],
) -> Result<ResultSet, SqlCrudError> {
    let pg_client: &mut tokio_postgres::Client = client;
    let tx = pg_client.transaction().await?;
    let mut all = ResultSet::default();
    for stmt in statements {
        tracing::debug!(sql = %stmt.sql, params = stmt.params.len(), "postgres statement");
        let params = Params::convert(&stmt.params);
        if stmt.returns_rows {
            let rows = tx.query(stmt.sql.as_str(), params.as_refs()).await?;
            all.extend(build_result_set_from_rows(&rows)?);
        } else {
            tx.execute(stmt.sql.as_str(), params.as_refs()).await?;
        }
    }
    tx.commit().await?;
    Ok(all)
}
