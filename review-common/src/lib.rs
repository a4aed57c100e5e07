//! # Review Pipeline Common Library
//!
//! Shared code for the review pipeline stages and the dashboard:
//! - Pipeline configuration loading
//! - Record types (raw documents, clean records, aggregates)
//! - Record Store bindings (SQLite collections)
//! - Common error type

pub mod config;
pub mod db;
pub mod error;
pub mod records;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use records::{AggregateRecord, CleanRecord, Dimension, Field, FieldKind, RawRecord};
