use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::error::SqlCrudError;
use crate::types::RowValues;

/// A row from a database query result
///
/// Column names and the name → index lookup are shared by every row of the same result set.
#[derive(Debug, Clone)]
pub struct DbRow {
    /// The column names for this row (shared across all rows in a result set)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row
    pub values: Vec<RowValues>,
    column_index: Arc<HashMap<String, usize>>,
}

impl DbRow {
    /// Create a row with its own column index.
    ///
    /// Result sets build the index once and use [`DbRow::with_index`] instead.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<RowValues>) -> Self {
        let index = Arc::new(build_column_index(&column_names));
        Self::with_index(column_names, index, values)
    }

    pub(crate) fn with_index(
        column_names: Arc<Vec<String>>,
        column_index: Arc<HashMap<String, usize>>,
        values: Vec<RowValues>,
    ) -> Self {
        Self {
            column_names,
            values,
            column_index,
        }
    }

    /// Get the index of a column by name
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index.get(column_name).copied()
    }

    /// Get a value from the row by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }

    /// Decode the named column into a Rust value.
    ///
    /// # Errors
    /// Returns [`SqlCrudError::DecodeError`] if the column is missing or holds a value of
    /// another type. `NULL` only decodes into `Option<T>`.
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use sql_crud::prelude::*;
    ///
    /// let row = DbRow::new(
    ///     Arc::new(vec!["id".into(), "nick".into()]),
    ///     vec![RowValues::Int(7), RowValues::Null],
    /// );
    /// let id: i64 = row.try_get("id")?;
    /// let nick: Option<String> = row.try_get("nick")?;
    /// assert_eq!((id, nick), (7, None));
    /// # Ok::<(), SqlCrudError>(())
    /// ```
    pub fn try_get<T: FromRowValue>(&self, column_name: &str) -> Result<T, SqlCrudError> {
        let value = self.get(column_name).ok_or_else(|| {
            SqlCrudError::DecodeError(format!("column `{column_name}` not present in row"))
        })?;
        T::from_row_value(value).ok_or_else(|| {
            SqlCrudError::DecodeError(format!(
                "column `{column_name}` holds {value:?}, expected {}",
                T::EXPECTED
            ))
        })
    }
}

pub(crate) fn build_column_index(column_names: &[String]) -> HashMap<String, usize> {
    column_names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), i))
        .collect()
}

/// Conversion from a single [`RowValues`] into a Rust type, used by [`DbRow::try_get`].
pub trait FromRowValue: Sized {
    /// Human-readable type name for decode errors.
    const EXPECTED: &'static str;

    fn from_row_value(value: &RowValues) -> Option<Self>;
}

impl FromRowValue for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_row_value(value: &RowValues) -> Option<Self> {
        value.as_int().copied()
    }
}

impl FromRowValue for i32 {
    const EXPECTED: &'static str = "32-bit integer";

    fn from_row_value(value: &RowValues) -> Option<Self> {
        value.as_int().and_then(|v| i32::try_from(*v).ok())
    }
}

impl FromRowValue for f64 {
    const EXPECTED: &'static str = "float";

    fn from_row_value(value: &RowValues) -> Option<Self> {
        value.as_float()
    }
}

impl FromRowValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_row_value(value: &RowValues) -> Option<Self> {
        value.as_bool()
    }
}

impl FromRowValue for String {
    const EXPECTED: &'static str = "text";

    fn from_row_value(value: &RowValues) -> Option<Self> {
        value.as_text().map(str::to_string)
    }
}

impl FromRowValue for NaiveDateTime {
    const EXPECTED: &'static str = "timestamp";

    fn from_row_value(value: &RowValues) -> Option<Self> {
        value.as_timestamp()
    }
}

impl FromRowValue for JsonValue {
    const EXPECTED: &'static str = "json";

    fn from_row_value(value: &RowValues) -> Option<Self> {
        value.as_json()
    }
}

impl FromRowValue for Vec<u8> {
    const EXPECTED: &'static str = "blob";

    fn from_row_value(value: &RowValues) -> Option<Self> {
        value.as_blob().map(<[u8]>::to_vec)
    }
}

impl<T: FromRowValue> FromRowValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_row_value(value: &RowValues) -> Option<Self> {
        if value.is_null() {
            Some(None)
        } else {
            T::from_row_value(value).map(Some)
        }
    }
}
