use std::sync::LazyLock;

use postgresql_embedded::PostgreSQL;
use tokio::runtime::Runtime;

use crate::config::ConnectionDescriptor;
use crate::types::Dialect;

/// Shared tokio runtime so server start and stop happen outside the caller's runtime
static SHARED_RUNTIME: LazyLock<Runtime> =
    LazyLock::new(|| Runtime::new().expect("Failed to create tokio runtime for test utilities"));

/// A running embedded `PostgreSQL` server and a descriptor that reaches its test database.
pub struct EmbeddedPostgres {
    pub postgresql: PostgreSQL,
    pub descriptor: ConnectionDescriptor,
}

/// Start an embedded server and create `database_name` on it.
///
/// Blocks on a private runtime, so call it from a plain `#[test]` (not from inside
/// `#[tokio::test]`).
///
/// # Errors
/// Returns an error if the server cannot be set up or started, the database cannot be
/// created, or the post-start `SELECT 1` fails.
pub fn setup_postgres_embedded(
    database_name: &str,
) -> Result<EmbeddedPostgres, Box<dyn std::error::Error>> {
    SHARED_RUNTIME.block_on(async {
        let mut postgresql = PostgreSQL::default();
        postgresql.setup().await?;
        postgresql.start().await?;
        postgresql.create_database(database_name).await?;

        let settings = postgresql.settings();
        let descriptor = ConnectionDescriptor::new(&settings.username, &settings.password)
            .dialect(Dialect::Postgres)
            .host(settings.host.clone())
            .port(settings.port)
            .database_name(database_name)
            .pool_size(4);
        tracing::info!(port = settings.port, database = database_name, "embedded postgres started");

        // Connectivity check through the same URL path the facade uses
        let target = format!(
            "postgresql://{}:{}@{}:{}/{database_name}",
            urlencoding::encode(&settings.username),
            urlencoding::encode(&settings.password),
            settings.host,
            settings.port
        );
        let (client, connection) = tokio_postgres::connect(&target, tokio_postgres::NoTls).await?;
        let driver = tokio::spawn(connection);
        client.execute("SELECT 1", &[]).await?;
        drop(client);
        let _ = driver.await;

        Ok(EmbeddedPostgres {
            postgresql,
            descriptor,
        })
    })
}

/// Stop a server started by [`setup_postgres_embedded`].
pub fn stop_postgres_embedded(postgres: EmbeddedPostgres) {
    let EmbeddedPostgres { postgresql, .. } = postgres;
    SHARED_RUNTIME.block_on(async move {
        let _ = postgresql.stop().await;
    });
}
