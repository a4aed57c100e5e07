//! Normalization stage
//!
//! Reads every raw document, validates each one independently into a
//! [`CleanRecord`], and replaces the clean collection with the survivors.
//! A rejected document is skipped; it never aborts the batch.

pub mod rules;
pub mod validator;

pub use validator::{validate, FieldValue, Rejection};

use crate::error::Result;
use review_common::db::{count, find_all_raw, replace_clean};
use review_common::{CleanRecord, PipelineConfig};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

/// Outcome of one normalization run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Raw documents read
    pub read: usize,
    /// Clean records written
    pub written: u64,
    /// Raw documents rejected
    pub skipped: usize,
}

/// Validated records plus the position and reason of every rejection
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub records: Vec<CleanRecord>,
    pub rejections: Vec<(usize, Rejection)>,
}

/// Validate a batch of raw documents, preserving input order
pub fn normalize_documents(documents: &[Value]) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    for (index, document) in documents.iter().enumerate() {
        match validate(document) {
            Ok(record) => batch.records.push(record),
            Err(rejection) => batch.rejections.push((index, rejection)),
        }
    }
    batch
}

/// Run the normalization stage against the store
pub async fn run(pool: &SqlitePool, config: &PipelineConfig) -> Result<NormalizeReport> {
    let names = &config.collections;

    let documents = find_all_raw(pool, &names.raw).await?;
    info!("Raw docs read from {}: {}", names.raw, documents.len());

    let batch = normalize_documents(&documents);
    for (index, rejection) in &batch.rejections {
        debug!("Skipping raw document #{}: {}", index, rejection);
    }
    if !batch.rejections.is_empty() {
        warn!(
            "Skipped {} of {} raw documents that could not be normalized",
            batch.rejections.len(),
            documents.len()
        );
    }

    let written = replace_clean(pool, &names.clean, &batch.records).await?;
    info!("Clean row count in {}: {}", names.clean, count(pool, &names.clean).await?);

    Ok(NormalizeReport {
        read: documents.len(),
        written,
        skipped: batch.rejections.len(),
    })
}
