#![cfg(feature = "sqlite")]

mod common;

use common::{Membership, Note, sqlite_db, titles};
use serde_json::json;
use sql_crud::prelude::*;

#[tokio::test]
async fn insert_then_select_returns_inserted_rows() -> Result<(), Box<dyn std::error::Error>> {
    let db = sqlite_db("insert_select").await?;

    let inserted: Vec<Note> = db
        .insert(&[
            row_values! { "title" => "alpha", "score" => 1.5, "tags" => json!(["a"]) },
            row_values! { "title" => "beta", "score" => None::<f64>, "tags" => None::<String> },
        ])
        .await?;
    assert_eq!(inserted.len(), 2);
    assert!(inserted.iter().all(|n| n.id > 0 && !n.done));
    assert_eq!(inserted[0].tags, Some(json!(["a"])));
    assert_eq!(inserted[1].score, None);

    let all: Vec<Note> = db.select(None).await?;
    for note in &inserted {
        assert!(all.contains(note), "{note:?} missing from select");
    }
    Ok(())
}

#[tokio::test]
async fn update_changes_only_matching_rows() -> Result<(), Box<dyn std::error::Error>> {
    let db = sqlite_db("update").await?;
    let _: Vec<Note> = db
        .insert(&[
            row_values! { "title" => "keep", "score" => 1.0 },
            row_values! { "title" => "bump", "score" => 1.0 },
            row_values! { "title" => "bump", "score" => 2.0 },
        ])
        .await?;

    let filter = col("title").eq("bump");
    let updated: Vec<Note> = db
        .update(&filter, &row_values! { "done" => true, "score" => 9.0 })
        .await?;
    assert_eq!(updated.len(), 2);
    assert!(updated.iter().all(|n| n.done && n.score == Some(9.0)));

    let reread: Vec<Note> = db.select(Some(&filter)).await?;
    assert_eq!(reread.len(), 2);
    assert!(reread.iter().all(|n| n.done));

    let untouched: Vec<Note> = db.select(Some(&col("title").eq("keep"))).await?;
    assert_eq!(untouched.len(), 1);
    assert!(!untouched[0].done);
    assert_eq!(untouched[0].score, Some(1.0));
    Ok(())
}

#[tokio::test]
async fn delete_returns_pre_deletion_rows() -> Result<(), Box<dyn std::error::Error>> {
    let db = sqlite_db("delete").await?;
    let inserted: Vec<Note> = db
        .insert(&[
            row_values! { "title" => "old", "score" => 1.0 },
            row_values! { "title" => "old", "score" => 2.0 },
            row_values! { "title" => "new" },
        ])
        .await?;

    let filter = col("title").eq("old");
    let deleted: Vec<Note> = db.delete(&filter).await?;
    let mut expected: Vec<Note> = inserted.into_iter().filter(|n| n.title == "old").collect();
    expected.sort_by_key(|n| n.id);
    let mut deleted_sorted = deleted.clone();
    deleted_sorted.sort_by_key(|n| n.id);
    assert_eq!(deleted_sorted, expected);

    assert!(db.select::<Note>(Some(&filter)).await?.is_empty());
    assert_eq!(titles(&db.select::<Note>(None).await?), vec!["new"]);
    Ok(())
}

#[tokio::test]
async fn update_by_primary_key_touches_only_keyed_rows() -> Result<(), Box<dyn std::error::Error>>
{
    let db = sqlite_db("update_by_pk").await?;
    let _: Vec<Membership> = db
        .insert(&[
            row_values! { "team" => "red", "member" => "ann", "role" => "member" },
            row_values! { "team" => "red", "member" => "bob", "role" => "member" },
            row_values! { "team" => "blue", "member" => "ann", "role" => "member" },
        ])
        .await?;

    let updated: Vec<Membership> = db
        .update_by_primary_key(&[
            row_values! { "team" => "red", "member" => "ann", "role" => "lead" },
            row_values! { "team" => "blue", "member" => "ann", "role" => "guest" },
        ])
        .await?;
    assert_eq!(updated.len(), 2);

    let mut all: Vec<Membership> = db.select(None).await?;
    all.sort_by(|a, b| (&a.team, &a.member).cmp(&(&b.team, &b.member)));
    let roles: Vec<(&str, &str, &str)> = all
        .iter()
        .map(|m| (m.team.as_str(), m.member.as_str(), m.role.as_str()))
        .collect();
    assert_eq!(
        roles,
        vec![
            ("blue", "ann", "guest"),
            ("red", "ann", "lead"),
            ("red", "bob", "member"),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn failed_update_by_primary_key_keeps_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let db = sqlite_db("update_by_pk_rollback").await?;
    let notes: Vec<Note> = db.insert(&[row_values! { "title" => "first" }]).await?;
    let id = notes[0].id;

    // The second map violates NOT NULL, so the first update must roll back with it.
    let result = db
        .update_by_primary_key::<Note>(&[
            row_values! { "id" => id, "title" => "changed" },
            row_values! { "id" => id, "title" => None::<String> },
        ])
        .await;
    assert!(matches!(result, Err(SqlCrudError::SqliteError(_))));

    let reread: Vec<Note> = db.select(Some(&col("id").eq(id))).await?;
    assert_eq!(reread[0].title, "first");
    Ok(())
}

#[tokio::test]
async fn predicates_compose() -> Result<(), Box<dyn std::error::Error>> {
    let db = sqlite_db("predicates").await?;
    let _: Vec<Note> = db
        .insert(&[
            row_values! { "title" => "apple", "score" => 1.0 },
            row_values! { "title" => "apricot", "score" => 5.0 },
            row_values! { "title" => "banana", "score" => None::<f64> },
            row_values! { "title" => "cherry", "score" => 3.0 },
        ])
        .await?;

    let ap = col("title").like("ap%") & col("score").gt(2.0);
    assert_eq!(titles(&db.select(Some(&ap)).await?), vec!["apricot"]);

    let unscored_or_cherry = col("score").is_null() | col("title").eq("cherry");
    assert_eq!(
        titles(&db.select(Some(&unscored_or_cherry)).await?),
        vec!["banana", "cherry"]
    );

    let listed = col("title").in_list(["apple", "banana"]);
    assert_eq!(titles(&db.select(Some(&!listed)).await?), vec!["apricot", "cherry"]);

    let nothing = col("title").in_list(Vec::<String>::new());
    assert!(db.select::<Note>(Some(&nothing)).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn defaults_only_insert_and_empty_inputs() -> Result<(), Box<dyn std::error::Error>> {
    let db = sqlite_db("defaults").await?;
    let rows: Vec<Membership> = db.insert(&[]).await?;
    assert!(rows.is_empty());
    let rows: Vec<Membership> = db.update_by_primary_key(&[]).await?;
    assert!(rows.is_empty());

    // title has no default, so a defaults-only row is rejected by the database
    let err = db.insert::<Note>(&[row_values! {}]).await.unwrap_err();
    assert!(matches!(err, SqlCrudError::SqliteError(_)));
    Ok(())
}

#[tokio::test]
async fn insert_accepts_differing_column_sets_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let db = sqlite_db("mixed_insert").await?;
    // The defaults-only row violates NOT NULL on `title`; earlier groups roll back with it.
    let failed = db
        .insert::<Note>(&[
            row_values! { "title" => "a", "score" => 1.0 },
            row_values! { "title" => "b" },
            row_values! {},
        ])
        .await;
    assert!(matches!(failed, Err(SqlCrudError::SqliteError(_))));
    assert!(db.select::<Note>(None).await?.is_empty());

    let inserted: Vec<Note> = db
        .insert(&[
            row_values! { "title" => "a", "score" => 1.0 },
            row_values! { "title" => "b" },
            row_values! { "title" => "c", "done" => true },
            row_values! { "title" => "d", "score" => 4.0 },
            row_values! { "title" => "e", "score" => 5.0 },
        ])
        .await?;
    let got: Vec<(&str, Option<f64>, bool)> = inserted
        .iter()
        .map(|n| (n.title.as_str(), n.score, n.done))
        .collect();
    assert_eq!(
        got,
        vec![
            ("a", Some(1.0), false),
            ("b", None, false),
            ("c", None, true),
            ("d", Some(4.0), false),
            ("e", Some(5.0), false),
        ]
    );
    assert!(inserted.windows(2).all(|w| w[0].id < w[1].id));
    assert_eq!(titles(&db.select::<Note>(None).await?), vec!["a", "b", "c", "d", "e"]);
    Ok(())
}

#[tokio::test]
async fn local_checks_raise_parameter_errors() -> Result<(), Box<dyn std::error::Error>> {
    let db = sqlite_db("parameter_errors").await?;

    let unknown_insert = db
        .insert::<Note>(&[
            row_values! { "title" => "a" },
            row_values! { "title" => "b", "colour" => "red" },
        ])
        .await;
    assert!(matches!(unknown_insert, Err(SqlCrudError::ParameterError(_))));
    assert!(db.select::<Note>(None).await?.is_empty());

    let empty_set = db.update::<Note>(&col("id").eq(1), &row_values! {}).await;
    assert!(matches!(empty_set, Err(SqlCrudError::ParameterError(_))));

    let unknown = db
        .update::<Note>(&col("id").eq(1), &row_values! { "colour" => "red" })
        .await;
    assert!(matches!(unknown, Err(SqlCrudError::ParameterError(_))));

    let missing_key = db
        .update_by_primary_key::<Membership>(&[row_values! { "team" => "red", "role" => "x" }])
        .await;
    assert!(matches!(missing_key, Err(SqlCrudError::ParameterError(_))));
    Ok(())
}

#[tokio::test]
async fn create_and_drop_are_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let db = sqlite_db("ddl").await?;
    let _: Vec<Note> = db.insert(&[row_values! { "title" => "survives" }]).await?;

    db.create_all::<Note>().await?;
    assert_eq!(titles(&db.select::<Note>(None).await?), vec!["survives"]);

    db.drop_all::<Note>().await?;
    db.drop_all::<Note>().await?;
    assert!(matches!(
        db.select::<Note>(None).await,
        Err(SqlCrudError::SqliteError(_))
    ));
    Ok(())
}

#[tokio::test]
async fn decode_errors_surface_from_entity_mapping() -> Result<(), Box<dyn std::error::Error>> {
    #[derive(Debug)]
    struct WrongShape {
        _title: i64,
    }

    impl Entity for WrongShape {
        fn table() -> &'static TableDef {
            &common::NOTES
        }

        fn from_row(row: &DbRow) -> Result<Self, SqlCrudError> {
            Ok(WrongShape {
                _title: row.try_get("title")?,
            })
        }
    }

    let db = sqlite_db("decode").await?;
    let _: Vec<Note> = db.insert(&[row_values! { "title" => "text" }]).await?;
    let err = db.select::<WrongShape>(None).await.unwrap_err();
    assert!(matches!(err, SqlCrudError::DecodeError(_)), "{err:?}");
    Ok(())
}

#[tokio::test]
async fn handles_from_descriptor_and_url_share_the_file() -> Result<(), Box<dyn std::error::Error>>
{
    let path = common::unique_db_path("descriptor");
    let from_descriptor = Database::new(
        ConnectionDescriptor::new("", "")
            .dialect(Dialect::Sqlite)
            .database_name(path.clone())
            .pool_size(2),
    )?;
    from_descriptor.create_all::<Note>().await?;
    let _: Vec<Note> = from_descriptor
        .insert(&[row_values! { "title" => "shared" }])
        .await?;

    let url = from_descriptor.url().as_str().to_string();
    let from_url = Database::from_url(&url)?;
    assert_eq!(titles(&from_url.select::<Note>(None).await?), vec!["shared"]);
    Ok(())
}

#[tokio::test]
async fn in_memory_database_persists_across_calls() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::from_url("sqlite+rusqlite://:memory:")?;
    db.create_all::<Note>().await?;
    let _: Vec<Note> = db.insert(&[row_values! { "title" => "kept" }]).await?;
    let _: Vec<Note> = db
        .update(&col("title").eq("kept"), &row_values! { "done" => true })
        .await?;

    let notes: Vec<Note> = db.select(None).await?;
    assert_eq!(titles(&notes), vec!["kept"]);
    assert!(notes[0].done);
    Ok(())
}

#[test]
fn bad_configuration_is_rejected_up_front() {
    assert!(matches!(
        Database::from_url("mysql://u@h:3306/d"),
        Err(SqlCrudError::ConfigError(_))
    ));
    assert!(matches!(
        Database::sqlite(SqliteOptions::new(common::unique_db_path("zero")).with_pool_size(0)),
        Err(SqlCrudError::ConfigError(_))
    ));
}
