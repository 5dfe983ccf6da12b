use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use super::DatabaseSetupError;

pub async fn connect_sqlite(url: &url::Url) -> Result<SqlitePool, DatabaseSetupError> {
    if url.as_str().contains(":memory:") {
        return connect_sqlite_memory().await;
    }

    let options = SqliteConnectOptions::from_str(url.as_str())
        .map_err(DatabaseSetupError::Unavailable)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(DatabaseSetupError::Unavailable)?;

    Ok(pool)
}

/// Every connection to `:memory:` opens its own database, so the pool is
/// held to a single connection that is never recycled.
pub async fn connect_sqlite_memory() -> Result<SqlitePool, DatabaseSetupError> {
    let options = SqliteConnectOptions::new().filename(":memory:");

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(DatabaseSetupError::Unavailable)
}

pub async fn migrate_sqlite(pool: &SqlitePool) -> Result<(), DatabaseSetupError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(DatabaseSetupError::MigrationFailed)
}
