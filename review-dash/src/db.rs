//! Read-only store access for the dashboard
//!
//! The dashboard never writes: connections are opened with `mode=ro`.

use anyhow::{Context, Result};
use review_common::config::CollectionNames;
use review_common::db::find_all_aggregates;
use review_common::{AggregateRecord, Dimension};
use sqlx::SqlitePool;
use std::path::Path;

/// Connect to the store in read-only mode
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        anyhow::bail!(
            "Database not found: {}\nRun review-etl first to create and fill the store.",
            db_path.display()
        );
    }

    // No immutable=1: pipeline stages may write while the dashboard reads
    let db_url = format!("sqlite://{}?mode=ro", db_path.display());

    let pool = SqlitePool::connect(&db_url)
        .await
        .context("Failed to connect to database in read-only mode")?;

    // Verify read-only by attempting a write (should fail)
    #[cfg(debug_assertions)]
    {
        let write_test = sqlx::query("CREATE TABLE _test_write (id INTEGER)")
            .execute(&pool)
            .await;
        if write_test.is_ok() {
            anyhow::bail!("Database connection is not read-only");
        }
    }

    Ok(pool)
}

/// City and state aggregates, in stored order
pub async fn load_aggregates(
    pool: &SqlitePool,
    names: &CollectionNames,
) -> review_common::Result<(Vec<AggregateRecord>, Vec<AggregateRecord>)> {
    let cities = find_all_aggregates(pool, names.aggregate(Dimension::City)).await?;
    let states = find_all_aggregates(pool, names.aggregate(Dimension::State)).await?;
    Ok((cities, states))
}
