//! Clients table DDL and connectivity. The table lives in the schema named by `Config::database_schema`.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Config;

pub const CLIENTS_TABLE: &str = "clients";

/// Non-key columns with their DDL. Reconciled additively on every start.
const COLUMNS: &[(&str, &str)] = &[
    ("first_name", "VARCHAR(255) NOT NULL"),
    ("last_name", "VARCHAR(255) NOT NULL"),
    ("email", "VARCHAR(255) NOT NULL"),
    ("phone", "VARCHAR(255)"),
    ("company", "VARCHAR(255)"),
    ("address", "VARCHAR(255)"),
    ("city", "VARCHAR(255)"),
    ("postal_code", "VARCHAR(255)"),
    ("country", "VARCHAR(255)"),
    ("created_at", "TIMESTAMPTZ NOT NULL DEFAULT NOW()"),
    ("updated_at", "TIMESTAMPTZ NOT NULL DEFAULT NOW()"),
];

/// Quote identifier for PostgreSQL.
pub(crate) fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Schema-qualified clients table (e.g. `"public"."clients"`).
pub fn qualified_table(schema: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(CLIENTS_TABLE))
}

/// Pool settings for the service. The acquire timeout caps how long a request,
/// including the health probe, waits on an unreachable database.
pub fn pool_options(config: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_acquire_timeout)
}

/// Open the shared pool.
pub async fn connect(database_url: &str, config: &Config) -> Result<PgPool, sqlx::Error> {
    pool_options(config).connect(database_url).await
}

/// Create schema and clients table if absent, then add any missing columns and the unique email index.
/// ADD COLUMN on an existing table cannot satisfy NOT NULL without a default, so reconciled columns are
/// added nullable; the CREATE TABLE path carries the full constraints.
pub async fn ensure_schema(pool: &PgPool, schema: &str) -> Result<(), sqlx::Error> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(schema)))
        .execute(pool)
        .await?;

    let table = qualified_table(schema);
    let col_defs: Vec<String> = COLUMNS
        .iter()
        .map(|(name, def)| format!("{} {}", quoted(name), def))
        .collect();
    let ddl = format!(
        "CREATE TABLE IF NOT EXISTS {} (\"id\" SERIAL PRIMARY KEY, {})",
        table,
        col_defs.join(", ")
    );
    tracing::debug!(sql = %ddl, "ensure table");
    sqlx::query(&ddl).execute(pool).await?;

    for (name, def) in COLUMNS {
        let relaxed = if def.contains("DEFAULT") {
            def.to_string()
        } else {
            def.replace(" NOT NULL", "")
        };
        let alter = format!(
            "ALTER TABLE {} ADD COLUMN IF NOT EXISTS {} {}",
            table,
            quoted(name),
            relaxed
        );
        sqlx::query(&alter).execute(pool).await?;
    }

    let index = format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ({})",
        quoted(&format!("{}_email_key", CLIENTS_TABLE)),
        table,
        quoted("email")
    );
    sqlx::query(&index).execute(pool).await?;
    tracing::info!(schema = %schema, table = CLIENTS_TABLE, "schema in sync");
    Ok(())
}

/// Round-trip to the database. Used by the health endpoint.
pub async fn connectivity_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").fetch_one(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quoted("clients"), "\"clients\"");
        assert_eq!(quoted("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(qualified_table("public"), "\"public\".\"clients\"");
    }

    #[tokio::test]
    async fn unreachable_database_fails_within_acquire_timeout() {
        let config = Config {
            db_acquire_timeout: std::time::Duration::from_millis(500),
            ..Config::default()
        };
        let pool = pool_options(&config)
            .connect_lazy("postgres://postgres@127.0.0.1:1/clients")
            .unwrap();
        let started = std::time::Instant::now();
        assert!(connectivity_check(&pool).await.is_err());
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }

    #[tokio::test]
    async fn connectivity_check_fails_on_closed_pool() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost:1/none")
            .unwrap();
        pool.close().await;
        assert!(connectivity_check(&pool).await.is_err());
    }
}
