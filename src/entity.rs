use crate::error::SqlCrudError;
use crate::results::DbRow;

/// A mapped row type: a static table description plus a constructor from a result row.
///
/// ```rust
/// use sql_crud::prelude::*;
///
/// #[derive(Debug)]
/// struct Note {
///     id: i64,
///     body: String,
/// }
///
/// static NOTES: TableDef = TableDef::new(
///     "notes",
///     &[
///         ColumnDef::new("id", SqlType::Integer).primary_key().auto_increment(),
///         ColumnDef::new("body", SqlType::Text),
///     ],
/// );
///
/// impl Entity for Note {
///     fn table() -> &'static TableDef {
///         &NOTES
///     }
///
///     fn from_row(row: &DbRow) -> Result<Self, SqlCrudError> {
///         Ok(Note {
///             id: row.try_get("id")?,
///             body: row.try_get("body")?,
///         })
///     }
/// }
/// # assert_eq!(Note::table().primary_key().count(), 1);
/// ```
pub trait Entity: Sized + Send + 'static {
    /// Table name and column definitions.
    fn table() -> &'static TableDef;

    /// Build an entity from one returned row.
    ///
    /// # Errors
    /// Returns [`SqlCrudError::DecodeError`] (usually via [`DbRow::try_get`]) when the row does
    /// not have the expected shape.
    fn from_row(row: &DbRow) -> Result<Self, SqlCrudError>;
}

/// Static description of a table.
#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

impl TableDef {
    #[must_use]
    pub const fn new(name: &'static str, columns: &'static [ColumnDef]) -> Self {
        Self { name, columns }
    }

    /// Primary-key columns in declaration order.
    pub fn primary_key(&self) -> impl Iterator<Item = &'static ColumnDef> + use<> {
        let columns: &'static [ColumnDef] = self.columns;
        columns.iter().filter(|c| c.primary_key)
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&'static ColumnDef> {
        let columns: &'static [ColumnDef] = self.columns;
        columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + use<> {
        let columns: &'static [ColumnDef] = self.columns;
        columns.iter().map(|c| c.name)
    }
}

/// Column type, rendered per dialect when creating tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    /// 64-bit integer (`BIGINT` / `INTEGER`)
    Integer,
    /// Double precision float
    Float,
    Text,
    Boolean,
    /// Timestamp without time zone
    Timestamp,
    Json,
    Blob,
}

/// One column of a [`TableDef`], built with `const` chained setters.
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub primary_key: bool,
    pub nullable: bool,
    /// Server-generated value for integer keys (identity / rowid alias).
    pub auto_increment: bool,
    /// Raw SQL default expression, e.g. `CURRENT_TIMESTAMP`.
    pub default: Option<&'static str>,
}

impl ColumnDef {
    #[must_use]
    pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            primary_key: false,
            nullable: false,
            auto_increment: false,
            default: None,
        }
    }

    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    #[must_use]
    pub const fn default_sql(mut self, expression: &'static str) -> Self {
        self.default = Some(expression);
        self
    }
}
