#![cfg(feature = "test-utils")]

mod common;

use common::{Membership, Note, titles};
use serde_json::json;
use sql_crud::prelude::*;
use sql_crud::test_utils::{setup_postgres_embedded, stop_postgres_embedded};

#[test]
fn postgres_crud_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let pg = setup_postgres_embedded("crud_test")?;
    let descriptor = pg.descriptor.clone();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let db = Database::new(descriptor)?;
        assert_eq!(db.dialect(), Dialect::Postgres);
        db.create_all::<Note>().await?;
        db.create_all::<Note>().await?;
        db.create_all::<Membership>().await?;

        let inserted: Vec<Note> = db
            .insert(&[
                row_values! { "title" => "alpha", "score" => 1.5, "tags" => json!({"k": 1}) },
                row_values! { "title" => "beta", "score" => None::<f64>, "tags" => None::<String> },
                row_values! { "title" => "gamma", "score" => 3.0, "tags" => None::<String> },
            ])
            .await?;
        assert_eq!(inserted.len(), 3);
        assert_eq!(inserted[0].tags, Some(json!({"k": 1})));

        let all: Vec<Note> = db.select(None).await?;
        for note in &inserted {
            assert!(all.contains(note));
        }

        let updated: Vec<Note> = db
            .update(&col("score").is_null(), &row_values! { "score" => 0.5, "done" => true })
            .await?;
        assert_eq!(titles(&updated), vec!["beta"]);
        let untouched: Vec<Note> = db.select(Some(&col("title").ne("beta"))).await?;
        assert!(untouched.iter().all(|n| !n.done));

        let deleted: Vec<Note> = db.delete(&col("score").ge(1.5)).await?;
        assert_eq!(titles(&deleted), vec!["alpha", "gamma"]);
        assert!(db.select::<Note>(Some(&col("score").ge(1.5))).await?.is_empty());

        let _: Vec<Membership> = db
            .insert(&[
                row_values! { "team" => "red", "member" => "ann", "role" => "member" },
                row_values! { "team" => "red", "member" => "bob", "role" => "member" },
            ])
            .await?;
        let promoted: Vec<Membership> = db
            .update_by_primary_key(&[
                row_values! { "team" => "red", "member" => "bob", "role" => "lead" },
            ])
            .await?;
        assert_eq!(promoted.len(), 1);
        let ann: Vec<Membership> = db.select(Some(&col("member").eq("ann"))).await?;
        assert_eq!(ann[0].role, "member");

        db.drop_all::<Membership>().await?;
        db.drop_all::<Note>().await?;
        Ok::<(), SqlCrudError>(())
    })?;

    stop_postgres_embedded(pg);
    Ok(())
}

#[test]
fn postgres_driver_errors_pass_through() -> Result<(), Box<dyn std::error::Error>> {
    let pg = setup_postgres_embedded("errors_test")?;
    let descriptor = pg.descriptor.clone();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let db = Database::new(descriptor)?;
        let missing = db.select::<Note>(None).await;
        assert!(matches!(missing, Err(SqlCrudError::PostgresError(_))));

        let wrong_password = Database::new(pg_descriptor_with_password(&db, "definitely-wrong"))?;
        assert!(wrong_password.select::<Note>(None).await.is_err());
        Ok::<(), SqlCrudError>(())
    })?;

    stop_postgres_embedded(pg);
    Ok(())
}

fn pg_descriptor_with_password(db: &Database, password: &str) -> ConnectionDescriptor {
    let mut descriptor = db
        .descriptor()
        .cloned()
        .unwrap_or_else(|| ConnectionDescriptor::new("postgres", ""));
    descriptor.password = password.to_string();
    descriptor
}
