use std::path::PathBuf;

use clap::Parser;
use sql_crud::{ConnectionDescriptor, Dialect, SqlCrudError};

#[derive(Parser, Debug)]
#[command(author, version, about = "Run one create/insert/select/update/delete cycle")]
pub(crate) struct Args {
    /// JSON connection descriptor; overrides the individual flags below
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "sqlite")]
    pub(crate) dialect: Dialect,
    #[arg(long, default_value = "postgres")]
    pub(crate) user: String,
    #[arg(long, default_value = "", env = "SQL_CRUD_PASSWORD", hide_env_values = true)]
    pub(crate) password: String,
    #[arg(long, default_value = "localhost")]
    pub(crate) host: String,
    #[arg(long, default_value_t = 5432)]
    pub(crate) port: u16,
    /// Database name, or the file path for SQLite
    #[arg(long, default_value = "smoke.db")]
    pub(crate) database: String,
    #[arg(long)]
    pub(crate) driver: Option<String>,
    #[arg(long, default_value_t = 4)]
    pub(crate) pool_size: u32,
    /// Drop the demo table when finished
    #[arg(long)]
    pub(crate) cleanup: bool,
    #[arg(long)]
    pub(crate) log: Option<PathBuf>,
}

impl Args {
    pub(crate) fn descriptor(&self) -> Result<ConnectionDescriptor, SqlCrudError> {
        if let Some(path) = &self.config {
            return ConnectionDescriptor::from_json_file(path);
        }
        let mut descriptor = ConnectionDescriptor::new(&self.user, &self.password)
            .dialect(self.dialect)
            .host(&self.host)
            .port(self.port)
            .database_name(&self.database)
            .pool_size(self.pool_size);
        if let Some(driver) = &self.driver {
            descriptor = descriptor.driver(driver);
        }
        Ok(descriptor)
    }
}
