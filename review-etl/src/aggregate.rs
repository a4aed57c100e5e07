//! Aggregation stage
//!
//! For each dimension (City, State) runs the grouping query against the clean
//! collection and replaces that dimension's output collection with the
//! result. An empty clean collection simply yields empty outputs.

use crate::error::Result;
use review_common::db::{count, group_stats, replace_aggregates};
use review_common::{Dimension, PipelineConfig};
use sqlx::SqlitePool;
use tracing::info;

/// Outcome of aggregating one dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateReport {
    pub dimension: Dimension,
    /// Documents in the output collection afterwards
    pub groups: i64,
}

/// Aggregate one dimension into its output collection
pub async fn aggregate_dimension(
    pool: &SqlitePool,
    config: &PipelineConfig,
    dimension: Dimension,
) -> Result<AggregateReport> {
    let names = &config.collections;
    let output = names.aggregate(dimension);

    let results = group_stats(pool, &names.clean, dimension).await?;
    replace_aggregates(pool, output, &results).await?;

    let groups = count(pool, output).await?;
    info!("{} documents: {}", output, groups);

    Ok(AggregateReport { dimension, groups })
}

/// Run the aggregation stage: City, then State
pub async fn run(pool: &SqlitePool, config: &PipelineConfig) -> Result<Vec<AggregateReport>> {
    let mut reports = Vec::with_capacity(Dimension::ALL.len());
    for dimension in Dimension::ALL {
        reports.push(aggregate_dimension(pool, config, dimension).await?);
    }
    info!("Aggregations complete.");
    Ok(reports)
}
