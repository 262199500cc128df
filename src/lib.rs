#![forbid(unsafe_code)]
//! Async CRUD over mapped entity types for `PostgreSQL` (tokio-postgres) and `SQLite`
//! (rusqlite).
//!
//! A [`Database`] owns the connection details and a pooled session factory. Each operation
//! checks out one session, runs its statement(s) in a single transaction, and returns the
//! affected rows mapped through [`Entity::from_row`].
//!
//! ```rust,no_run
//! use sql_crud::prelude::*;
//!
//! #[derive(Debug)]
//! struct Note {
//!     id: i64,
//!     body: String,
//! }
//!
//! static NOTES: TableDef = TableDef::new(
//!     "notes",
//!     &[
//!         ColumnDef::new("id", SqlType::Integer).primary_key().auto_increment(),
//!         ColumnDef::new("body", SqlType::Text),
//!     ],
//! );
//!
//! impl Entity for Note {
//!     fn table() -> &'static TableDef {
//!         &NOTES
//!     }
//!     fn from_row(row: &DbRow) -> Result<Self, SqlCrudError> {
//!         Ok(Note { id: row.try_get("id")?, body: row.try_get("body")? })
//!     }
//! }
//!
//! # async fn demo() -> Result<(), SqlCrudError> {
//! let db = Database::sqlite(SqliteOptions::new("notes.db".to_string()))?;
//! db.create_all::<Note>().await?;
//! let inserted: Vec<Note> = db.insert(&[row_values! { "body" => "hello" }]).await?;
//! let updated: Vec<Note> = db
//!     .update(&col("id").eq(inserted[0].id), &row_values! { "body" => "hi" })
//!     .await?;
//! assert_eq!(updated[0].body, "hi");
//! # Ok(())
//! # }
//! ```

pub mod prelude;

pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod executor;
pub mod pool;
pub mod predicate;
pub mod results;
pub mod statement;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(test, feature = "test-utils-postgres"))]
pub mod test_utils;

pub use config::{ConnectionDescriptor, ConnectionUrl};
pub use database::Database;
pub use entity::{ColumnDef, Entity, SqlType, TableDef};
pub use error::SqlCrudError;
pub use executor::QueryExecutor;
pub use pool::{Access, CrudPool, Session, SessionFactory};
pub use predicate::{Predicate, col};
pub use results::{DbRow, FromRowValue, ResultSet};
pub use statement::Statement;
pub use types::{Dialect, PlaceholderStyle, RowValues, ValueMap};

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteOptions, SqliteOptionsBuilder};
