#![allow(dead_code)]

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;
use sql_crud::prelude::*;
use tempfile::tempdir;

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub done: bool,
    pub score: Option<f64>,
    pub tags: Option<JsonValue>,
    pub created_at: NaiveDateTime,
}

pub static NOTES: TableDef = TableDef::new(
    "notes",
    &[
        ColumnDef::new("id", SqlType::Integer)
            .primary_key()
            .auto_increment(),
        ColumnDef::new("title", SqlType::Text),
        ColumnDef::new("done", SqlType::Boolean).default_sql("FALSE"),
        ColumnDef::new("score", SqlType::Float).nullable(),
        ColumnDef::new("tags", SqlType::Json).nullable(),
        ColumnDef::new("created_at", SqlType::Timestamp).default_sql("CURRENT_TIMESTAMP"),
    ],
);

impl Entity for Note {
    fn table() -> &'static TableDef {
        &NOTES
    }

    fn from_row(row: &DbRow) -> Result<Self, SqlCrudError> {
        Ok(Note {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            done: row.try_get("done")?,
            score: row.try_get("score")?,
            tags: row.try_get("tags")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Composite key table used for update-by-key checks.
#[derive(Debug, Clone, PartialEq)]
pub struct Membership {
    pub team: String,
    pub member: String,
    pub role: String,
}

pub static MEMBERSHIPS: TableDef = TableDef::new(
    "memberships",
    &[
        ColumnDef::new("team", SqlType::Text).primary_key(),
        ColumnDef::new("member", SqlType::Text).primary_key(),
        ColumnDef::new("role", SqlType::Text),
    ],
);

impl Entity for Membership {
    fn table() -> &'static TableDef {
        &MEMBERSHIPS
    }

    fn from_row(row: &DbRow) -> Result<Self, SqlCrudError> {
        Ok(Membership {
            team: row.try_get("team")?,
            member: row.try_get("member")?,
            role: row.try_get("role")?,
        })
    }
}

pub fn unique_db_path(prefix: &str) -> String {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join(format!("{prefix}.db"));
    // Leak the tempdir so the file persists for the duration of the test binary.
    std::mem::forget(dir);
    path.to_string_lossy().into_owned()
}

pub async fn sqlite_db(prefix: &str) -> Result<Database, SqlCrudError> {
    let db = Database::sqlite(
        SqliteOptionsBuilder::new(unique_db_path(prefix))
            .pool_size(4)
            .finish(),
    )?;
    db.create_all::<Note>().await?;
    db.create_all::<Membership>().await?;
    Ok(db)
}

pub fn titles(notes: &[Note]) -> Vec<&str> {
    let mut titles: Vec<&str> = notes.iter().map(|n| n.title.as_str()).collect();
    titles.sort_unstable();
    titles
}
