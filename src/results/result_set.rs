use std::collections::HashMap;
use std::sync::Arc;

use super::row::{DbRow, build_column_index};
use crate::types::RowValues;

/// Rows materialized from one or more statements executed in a single session.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the statements, in the order the database sent them
    pub results: Vec<DbRow>,
    /// Column names shared by all rows (to avoid duplicating in each row)
    column_names: Option<Arc<Vec<String>>>,
    column_index: Option<Arc<HashMap<String, usize>>>,
}

impl ResultSet {
    /// Create a new result set with a known capacity
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            column_names: None,
            column_index: None,
        }
    }

    /// Set the column names for this result set (to be shared by all rows)
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_index = Some(Arc::new(build_column_index(&column_names)));
        self.column_names = Some(column_names);
    }

    /// Add a row to the result set. Rows added before column names are set are dropped.
    pub fn add_row_values(&mut self, row_values: Vec<RowValues>) {
        if let (Some(names), Some(index)) = (&self.column_names, &self.column_index) {
            self.results.push(DbRow::with_index(
                Arc::clone(names),
                Arc::clone(index),
                row_values,
            ));
        }
    }

    /// Append the rows of another result set; rows keep their own column metadata.
    pub fn extend(&mut self, other: ResultSet) {
        if self.column_names.is_none() {
            self.column_names = other.column_names;
            self.column_index = other.column_index;
        }
        self.results.extend(other.results);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
