//! Store initialization
//!
//! Opens (creating if needed) the SQLite database and the four collections.
//! Safe to call on every stage start: all statements are idempotent.

use crate::config::CollectionNames;
use crate::db::schema::{aggregate_columns, clean_columns, create_table_sql, raw_columns};
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Lock wait applied to every pooled connection
pub const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Open the store for writing, creating the database and collections if missing
pub async fn open_store(db_path: &Path, names: &CollectionNames) -> Result<SqlitePool> {
    names.validate()?;

    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // busy_timeout is per connection, so it goes on the connect options
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .busy_timeout(BUSY_TIMEOUT);
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_collections(&pool, names).await?;

    Ok(pool)
}

/// Create all four collections (no-op for existing ones)
pub async fn create_collections(pool: &SqlitePool, names: &CollectionNames) -> Result<()> {
    sqlx::query(&create_table_sql(&names.raw, &raw_columns()))
        .execute(pool)
        .await?;
    sqlx::query(&create_table_sql(&names.clean, &clean_columns()))
        .execute(pool)
        .await?;
    sqlx::query(&create_table_sql(&names.city, &aggregate_columns()))
        .execute(pool)
        .await?;
    sqlx::query(&create_table_sql(&names.state, &aggregate_columns()))
        .execute(pool)
        .await?;

    Ok(())
}
