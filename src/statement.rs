//! Rendering of the statement shapes the executor sends: select, insert, update,
//! update-by-primary-key, delete, and the create/drop DDL.
//!
//! Identifiers are always double-quoted and every value is bound as a parameter, so caller
//! data never ends up in the SQL text.

use crate::entity::{ColumnDef, SqlType, TableDef};
use crate::error::SqlCrudError;
use crate::predicate::Predicate;
use crate::types::{Dialect, PlaceholderStyle, RowValues, ValueMap};

/// Incremental SQL text plus the parameters its placeholders refer to.
#[derive(Debug)]
pub struct SqlWriter {
    sql: String,
    params: Vec<RowValues>,
    style: PlaceholderStyle,
}

impl SqlWriter {
    #[must_use]
    pub fn new(style: PlaceholderStyle) -> Self {
        Self {
            sql: String::with_capacity(128),
            params: Vec::new(),
            style,
        }
    }

    pub fn push(&mut self, fragment: &str) {
        self.sql.push_str(fragment);
    }

    /// Append a double-quoted identifier.
    pub fn push_ident(&mut self, name: &str) {
        self.sql.push('"');
        self.sql.push_str(&name.replace('"', "\"\""));
        self.sql.push('"');
    }

    /// Append a placeholder bound to `value`.
    pub fn push_param(&mut self, value: RowValues) {
        self.params.push(value);
        let placeholder = self.style.placeholder(self.params.len());
        self.sql.push_str(&placeholder);
    }

    fn push_ident_list<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        for (i, name) in names.into_iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push_ident(name);
        }
    }

    fn push_returning(&mut self, table: &TableDef) {
        self.push(" RETURNING ");
        self.push_ident_list(table.column_names());
    }

    fn push_where(&mut self, predicate: &Predicate) {
        self.push(" WHERE ");
        predicate.write_sql(self);
    }

    #[must_use]
    pub fn finish(self) -> (String, Vec<RowValues>) {
        (self.sql, self.params)
    }

    fn into_statement(self, returns_rows: bool) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
            returns_rows,
        }
    }
}

/// One parameterized statement ready for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<RowValues>,
    /// Whether rows come back (`SELECT` or a `RETURNING` clause).
    pub returns_rows: bool,
}

/// `SELECT <cols> FROM <table> [WHERE <predicate>]`
#[must_use]
pub fn select(table: &TableDef, dialect: Dialect, predicate: Option<&Predicate>) -> Statement {
    let mut w = SqlWriter::new(dialect.placeholder_style());
    w.push("SELECT ");
    w.push_ident_list(table.column_names());
    w.push(" FROM ");
    w.push_ident(table.name);
    if let Some(predicate) = predicate {
        w.push_where(predicate);
    }
    w.into_statement(true)
}

/// `INSERT .. VALUES (..), (..) RETURNING <cols>` for each run of consecutive maps that
/// share a column set.
///
/// Maps with no columns at all insert a defaults-only row each (`DEFAULT VALUES`). The
/// statements keep the order of `rows`, so the returned rows do too.
#[must_use]
pub fn insert(table: &TableDef, dialect: Dialect, rows: &[ValueMap]) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut rest = rows;
    while let Some(first) = rest.first() {
        if first.is_empty() {
            let mut w = SqlWriter::new(dialect.placeholder_style());
            w.push("INSERT INTO ");
            w.push_ident(table.name);
            w.push(" DEFAULT VALUES");
            w.push_returning(table);
            statements.push(w.into_statement(true));
            rest = &rest[1..];
            continue;
        }

        let run = rest
            .iter()
            .position(|row| !row.keys().eq(first.keys()))
            .unwrap_or(rest.len());
        let (group, tail) = rest.split_at(run);
        statements.push(insert_group(table, dialect, group));
        rest = tail;
    }
    statements
}

fn insert_group(table: &TableDef, dialect: Dialect, group: &[ValueMap]) -> Statement {
    let mut w = SqlWriter::new(dialect.placeholder_style());
    w.push("INSERT INTO ");
    w.push_ident(table.name);
    w.push(" (");
    if let Some(first) = group.first() {
        w.push_ident_list(first.keys().map(String::as_str));
    }
    w.push(") VALUES ");
    for (i, row) in group.iter().enumerate() {
        if i > 0 {
            w.push(", ");
        }
        w.push("(");
        for (j, value) in row.values().enumerate() {
            if j > 0 {
                w.push(", ");
            }
            w.push_param(value.clone());
        }
        w.push(")");
    }
    w.push_returning(table);
    w.into_statement(true)
}

/// `UPDATE <table> SET .. WHERE <predicate> RETURNING <cols>`
///
/// # Errors
/// Returns [`SqlCrudError::ParameterError`] when `values` is empty.
pub fn update(
    table: &TableDef,
    dialect: Dialect,
    predicate: &Predicate,
    values: &ValueMap,
) -> Result<Statement, SqlCrudError> {
    if values.is_empty() {
        return Err(SqlCrudError::ParameterError(format!(
            "update of `{}` has no columns to set",
            table.name
        )));
    }
    let mut w = SqlWriter::new(dialect.placeholder_style());
    w.push("UPDATE ");
    w.push_ident(table.name);
    push_set_clause(&mut w, values.iter());
    w.push_where(predicate);
    w.push_returning(table);
    Ok(w.into_statement(true))
}

/// One `UPDATE .. WHERE <pk> = .. RETURNING <cols>` per map.
///
/// The entity's declared primary-key columns are pulled out of each map to build the
/// filter; every other key goes into the `SET` clause.
///
/// # Errors
/// Returns [`SqlCrudError::ParameterError`] when the table has no primary key, a map lacks
/// one of the key columns, or a map has nothing besides the key to set.
pub fn update_by_primary_key(
    table: &TableDef,
    dialect: Dialect,
    rows: &[ValueMap],
) -> Result<Vec<Statement>, SqlCrudError> {
    let key_columns: Vec<&ColumnDef> = table.primary_key().collect();
    if key_columns.is_empty() {
        return Err(SqlCrudError::ParameterError(format!(
            "`{}` declares no primary key",
            table.name
        )));
    }

    rows.iter()
        .enumerate()
        .map(|(pos, row)| {
            let mut key = Vec::with_capacity(key_columns.len());
            for column in &key_columns {
                let value = row.get(column.name).ok_or_else(|| {
                    SqlCrudError::ParameterError(format!(
                        "row {pos} for `{}` is missing primary-key column `{}`",
                        table.name, column.name
                    ))
                })?;
                key.push(col_eq(column.name, value));
            }
            let mut assignments = row
                .iter()
                .filter(|(name, _)| !key_columns.iter().any(|c| c.name == name.as_str()))
                .peekable();
            if assignments.peek().is_none() {
                return Err(SqlCrudError::ParameterError(format!(
                    "row {pos} for `{}` has no non-key columns to set",
                    table.name
                )));
            }

            let mut w = SqlWriter::new(dialect.placeholder_style());
            w.push("UPDATE ");
            w.push_ident(table.name);
            push_set_clause(&mut w, assignments);
            w.push_where(&Predicate::all(key));
            w.push_returning(table);
            Ok(w.into_statement(true))
        })
        .collect()
}

/// `DELETE FROM <table> WHERE <predicate> RETURNING <cols>`
#[must_use]
pub fn delete(table: &TableDef, dialect: Dialect, predicate: &Predicate) -> Statement {
    let mut w = SqlWriter::new(dialect.placeholder_style());
    w.push("DELETE FROM ");
    w.push_ident(table.name);
    w.push_where(predicate);
    w.push_returning(table);
    w.into_statement(true)
}

/// `CREATE TABLE IF NOT EXISTS` with dialect-specific column types.
#[must_use]
pub fn create_table(table: &TableDef, dialect: Dialect) -> Statement {
    let key_count = table.primary_key().count();
    // SQLite only auto-assigns keys through an inline INTEGER PRIMARY KEY (rowid alias).
    let inline_key = dialect == Dialect::Sqlite
        && key_count == 1
        && table.primary_key().any(|c| c.auto_increment);

    let mut w = SqlWriter::new(dialect.placeholder_style());
    w.push("CREATE TABLE IF NOT EXISTS ");
    w.push_ident(table.name);
    w.push(" (");
    for (i, column) in table.columns.iter().enumerate() {
        if i > 0 {
            w.push(", ");
        }
        w.push_ident(column.name);
        w.push(" ");
        if inline_key && column.primary_key {
            w.push("INTEGER PRIMARY KEY AUTOINCREMENT");
        } else {
            w.push(column_type(column, dialect));
        }
        if !column.nullable {
            w.push(" NOT NULL");
        }
        if let Some(default) = column.default {
            w.push(" DEFAULT ");
            w.push(default);
        }
    }
    if key_count > 0 && !inline_key {
        w.push(", PRIMARY KEY (");
        w.push_ident_list(table.primary_key().map(|c| c.name));
        w.push(")");
    }
    w.push(")");
    w.into_statement(false)
}

/// `DROP TABLE IF EXISTS`
#[must_use]
pub fn drop_table(table: &TableDef, dialect: Dialect) -> Statement {
    let mut w = SqlWriter::new(dialect.placeholder_style());
    w.push("DROP TABLE IF EXISTS ");
    w.push_ident(table.name);
    w.into_statement(false)
}

fn column_type(column: &ColumnDef, dialect: Dialect) -> &'static str {
    match (dialect, column.sql_type) {
        (Dialect::Postgres, SqlType::Integer) if column.auto_increment => {
            "BIGINT GENERATED BY DEFAULT AS IDENTITY"
        }
        (Dialect::Postgres, SqlType::Integer) => "BIGINT",
        (Dialect::Postgres, SqlType::Float) => "DOUBLE PRECISION",
        (Dialect::Postgres, SqlType::Json) => "JSONB",
        (Dialect::Postgres, SqlType::Blob) => "BYTEA",
        (Dialect::Sqlite, SqlType::Integer) => "INTEGER",
        (Dialect::Sqlite, SqlType::Float) => "REAL",
        (Dialect::Sqlite, SqlType::Json) => "TEXT",
        (Dialect::Sqlite, SqlType::Blob) => "BLOB",
        (_, SqlType::Text) => "TEXT",
        (_, SqlType::Boolean) => "BOOLEAN",
        (_, SqlType::Timestamp) => "TIMESTAMP",
    }
}

fn push_set_clause<'a>(
    w: &mut SqlWriter,
    assignments: impl Iterator<Item = (&'a String, &'a RowValues)>,
) {
    w.push(" SET ");
    for (i, (name, value)) in assignments.enumerate() {
        if i > 0 {
            w.push(", ");
        }
        w.push_ident(name);
        w.push(" = ");
        w.push_param(value.clone());
    }
}

fn col_eq(name: &str, value: &RowValues) -> Predicate {
    crate::predicate::col(name).eq(value.clone())
}
