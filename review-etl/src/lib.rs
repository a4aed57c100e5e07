//! review-etl library - ingestion, normalization and aggregation stages
//!
//! Each stage reads its input collection (or file), computes its full output,
//! and replaces its output collection wholesale. Stages are independent; the
//! operator runs them in order: ingest, clean, aggregate.

pub mod aggregate;
pub mod error;
pub mod ingest;
pub mod normalize;
pub mod tabular;

pub use error::{Error, Result};
