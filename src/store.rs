//! Database bootstrap: create the target database when it does not exist, and open the pool.

use crate::error::{ConfigError, StoreError};
use crate::settings::Settings;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

/// Connect to the `postgres` maintenance database on the same server and
/// `CREATE DATABASE` if the database named in `database_url` is missing.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StoreError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = PgConnectOptions::from_str(&admin_url).map_err(|e| invalid_url(e.to_string()))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

pub async fn connect(settings: &Settings) -> Result<PgPool, StoreError> {
    ensure_database_exists(&settings.database_url).await?;
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;
    Ok(pool)
}

/// The URL may carry credentials, so it is not echoed back.
fn invalid_url(reason: String) -> ConfigError {
    ConfigError::Invalid {
        key: "DATABASE_URL",
        value: "<redacted>".into(),
        reason,
    }
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), ConfigError> {
    let path_start = url.rfind('/').ok_or_else(|| invalid_url("no database path".into()))? + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let mut parts = path_and_query.splitn(2, '?');
    let db_name = parts.next().unwrap_or("").trim();
    let query = parts.next().map(|q| format!("?{}", q)).unwrap_or_default();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres{}", base, query);
    Ok((admin_url, db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_database_name_from_url() {
        let (admin, db) = parse_db_name_from_url("postgres://u:p@localhost:5432/todos").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(db, "todos");
    }

    #[test]
    fn keeps_query_string_on_admin_url() {
        let (admin, db) = parse_db_name_from_url("postgres://localhost/todos?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://localhost/postgres?sslmode=disable");
        assert_eq!(db, "todos");
    }

    #[test]
    fn url_without_path_is_a_config_error() {
        let err = parse_db_name_from_url("not a url").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DATABASE_URL", .. }));
        assert!(!err.to_string().contains("not a url"));
    }

    #[tokio::test]
    async fn unparseable_url_fails_before_connecting() {
        let err = ensure_database_exists("postgres://localhost:notaport/todos").await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Config(ConfigError::Invalid { key: "DATABASE_URL", .. })
        ));
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("to\"dos"), "\"to\"\"dos\"");
    }
}
