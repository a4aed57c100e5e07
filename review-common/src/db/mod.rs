//! Record Store bindings
//!
//! The document store is one SQLite database; each named collection is a
//! table. See [`schema`] for the table layouts.

pub mod collections;
pub mod init;
pub mod schema;

pub use collections::*;
pub use init::*;
