//! Convenient imports for common functionality.
//!
//! Everything needed to declare an entity and run the CRUD operations.

pub use crate::config::ConnectionDescriptor;
pub use crate::database::Database;
pub use crate::entity::{ColumnDef, Entity, SqlType, TableDef};
pub use crate::error::SqlCrudError;
pub use crate::predicate::{Predicate, col};
pub use crate::results::{DbRow, FromRowValue};
pub use crate::row_values;
pub use crate::types::{Dialect, RowValues, ValueMap};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteOptions, SqliteOptionsBuilder};
