mod args;
mod logging;
mod notes;

use clap::Parser;
use sql_crud::Database;
use tracing::Level;

use crate::args::Args;
use crate::logging::TeeWriter;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let writer = TeeWriter::new(args.log.clone()).unwrap_or_else(|err| {
        eprintln!("failed to open log file: {err}");
        std::process::exit(1);
    });

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_target(false)
        .with_max_level(Level::INFO)
        .init();

    let db = match args.descriptor().and_then(Database::new) {
        Ok(db) => db,
        Err(err) => {
            tracing::error!("cannot build database handle: {err}");
            std::process::exit(2);
        }
    };
    tracing::info!(url = %db.url(), dialect = ?db.dialect(), "connecting");

    match notes::run_cycle(&db, args.cleanup).await {
        Ok(remaining) => tracing::info!(remaining, "smoke cycle finished"),
        Err(err) => {
            tracing::error!("smoke cycle failed: {err}");
            std::process::exit(1);
        }
    }
}
