use std::sync::Arc;

use crate::results::DbRow;
use crate::types::RowValues;

/// Embedded `PostgreSQL` for integration tests and benchmarks
#[cfg(feature = "test-utils-postgres")]
pub mod postgres;

#[cfg(feature = "test-utils-postgres")]
pub use postgres::{EmbeddedPostgres, setup_postgres_embedded, stop_postgres_embedded};

/// Build a standalone row, handy for exercising `Entity::from_row` without a database.
#[must_use]
pub fn test_row(columns: &[&str], values: Vec<RowValues>) -> DbRow {
    let names = columns.iter().map(|c| (*c).to_string()).collect();
    DbRow::new(Arc::new(names), values)
}
