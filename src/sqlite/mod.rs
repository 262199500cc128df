// SQLite backend
//
// - config: bb8 connection manager and pool options
// - params: parameter conversion from `RowValues` to rusqlite values
// - query: result extraction and statement execution on the blocking pool

pub mod config;
pub mod params;
pub mod query;

pub use config::{SharedSqliteConnection, SqliteManager, SqliteOptions, SqliteOptionsBuilder};
pub use params::Params;
pub use query::build_result_set;
