//! Ingestion stage
//!
//! Loads the whole tabular input file into memory, converts each row into a
//! raw field mapping, and replaces the raw collection. The file is fully
//! parsed before the store is touched, so a parse failure leaves the previous
//! raw collection intact.

use crate::error::Result;
use crate::tabular::read_table;
use review_common::db::{count, replace_raw};
use review_common::PipelineConfig;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// Outcome of one ingestion run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Rows read from the input file
    pub rows_read: usize,
    /// Documents in the raw collection afterwards
    pub rows_persisted: i64,
}

/// Run the ingestion stage for `data_path`
pub async fn run(pool: &SqlitePool, config: &PipelineConfig, data_path: &Path) -> Result<IngestReport> {
    info!("Reading {}", data_path.display());
    let table = read_table(data_path)?;
    let rows_read = table.len();
    info!("Loaded rows from file: {}", rows_read);

    let records = table.into_records();
    replace_raw(pool, &config.collections.raw, &records).await?;

    let rows_persisted = count(pool, &config.collections.raw).await?;
    info!("Raw row count in {}: {}", config.collections.raw, rows_persisted);

    Ok(IngestReport {
        rows_read,
        rows_persisted,
    })
}
