use chrono::NaiveDateTime;
use serde::Serialize;
use sql_crud::prelude::*;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Note {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) pinned: bool,
    pub(crate) created_at: NaiveDateTime,
}

static NOTES: TableDef = TableDef::new(
    "smoke_notes",
    &[
        ColumnDef::new("id", SqlType::Integer)
            .primary_key()
            .auto_increment(),
        ColumnDef::new("title", SqlType::Text),
        ColumnDef::new("pinned", SqlType::Boolean).default_sql("FALSE"),
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
            pinned: row.try_get("pinned")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

fn log_rows(step: &str, notes: &[Note]) {
    let json = serde_json::to_string(notes).unwrap_or_else(|_| "[]".to_string());
    tracing::info!(step, rows = notes.len(), "{json}");
}

/// One full cycle against the demo table; returns the number of rows left behind.
pub(crate) async fn run_cycle(db: &Database, cleanup: bool) -> Result<usize, SqlCrudError> {
    db.create_all::<Note>().await?;
    tracing::info!(step = "create_all", table = NOTES.name, "table ready");

    let inserted: Vec<Note> = db
        .insert(&[
            row_values! { "title" => "buy milk" },
            row_values! { "title" => "file taxes" },
            row_values! { "title" => "call mom" },
        ])
        .await?;
    log_rows("insert", &inserted);

    let ids: Vec<i64> = inserted.iter().map(|n| n.id).collect();
    let mine = col("id").in_list(ids.iter().copied());
    log_rows("select", &db.select::<Note>(Some(&mine)).await?);

    let pinned: Vec<Note> = db
        .update(
            &(mine.clone() & col("title").like("file%")),
            &row_values! { "pinned" => true },
        )
        .await?;
    log_rows("update", &pinned);

    let renamed: Vec<Note> = db
        .update_by_primary_key(&[row_values! { "id" => ids[0], "title" => "buy oat milk" }])
        .await?;
    log_rows("update_by_primary_key", &renamed);

    let deleted: Vec<Note> = db.delete(&(mine.clone() & !col("pinned").eq(true))).await?;
    log_rows("delete", &deleted);

    let remaining = db.select::<Note>(Some(&mine)).await?;
    log_rows("remaining", &remaining);

    if cleanup {
        db.drop_all::<Note>().await?;
        tracing::info!(step = "drop_all", table = NOTES.name, "table dropped");
    }
    Ok(remaining.len())
}
