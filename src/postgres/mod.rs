// PostgreSQL backend
//
// - config: URL parsing and deadpool pool setup
// - params: `ToSql` for `RowValues`
// - query: result extraction and statement execution inside a transaction

pub mod config;
pub mod params;
pub mod query;

pub use config::create_pool;
pub use params::Params;
pub use query::build_result_set_from_rows;
