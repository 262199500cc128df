use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sql_crud::prelude::*;
use sql_crud::statement;
use tokio::runtime::Runtime;

#[derive(Debug)]
struct Reading {
    _id: i64,
    _sensor: String,
    _value: f64,
}

static READINGS: TableDef = TableDef::new(
    "readings",
    &[
        ColumnDef::new("id", SqlType::Integer)
            .primary_key()
            .auto_increment(),
        ColumnDef::new("sensor", SqlType::Text),
        ColumnDef::new("value", SqlType::Float),
    ],
);

impl Entity for Reading {
    fn table() -> &'static TableDef {
        &READINGS
    }

    fn from_row(row: &DbRow) -> Result<Self, SqlCrudError> {
        Ok(Reading {
            _id: row.try_get("id")?,
            _sensor: row.try_get("sensor")?,
            _value: row.try_get("value")?,
        })
    }
}

fn batch(rows: usize) -> Vec<ValueMap> {
    (0..rows)
        .map(|i| row_values! { "sensor" => format!("s-{}", i % 7), "value" => i as f64 * 0.5 })
        .collect()
}

fn bench_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    for rows in [1_usize, 100, 1000] {
        let maps = batch(rows);
        for dialect in [Dialect::Postgres, Dialect::Sqlite] {
            group.bench_with_input(
                BenchmarkId::new(format!("insert_{dialect:?}"), rows),
                &maps,
                |b, maps| b.iter(|| statement::insert(&READINGS, dialect, maps)),
            );
        }
    }
    let predicate = (col("sensor").in_list(["s-1", "s-2", "s-3"]) & col("value").gt(10.0))
        | col("value").is_null();
    group.bench_function("select_compound_predicate", |b| {
        b.iter(|| statement::select(&READINGS, Dialect::Postgres, Some(&predicate)));
    });
    group.finish();
}

fn bench_sqlite_round_trip(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bench.db").to_string_lossy().into_owned();
    let db = rt
        .block_on(async { Database::sqlite(SqliteOptions::new(path)) })
        .expect("sqlite handle");
    rt.block_on(db.create_all::<Reading>()).expect("create table");

    let db = &db;
    let mut group = c.benchmark_group("sqlite");
    for rows in [1_usize, 100] {
        let maps = batch(rows);
        group.bench_with_input(BenchmarkId::new("insert_select_delete", rows), &maps, |b, maps| {
            b.to_async(&rt).iter(|| async move {
                let _: Vec<Reading> = db.insert(maps).await.expect("insert");
                let filter = col("sensor").eq("s-1");
                let _: Vec<Reading> = db.select(Some(&filter)).await.expect("select");
                let _: Vec<Reading> = db.delete(&Predicate::Literal(true)).await.expect("delete");
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rendering, bench_sqlite_round_trip);
criterion_main!(benches);
