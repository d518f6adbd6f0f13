//! Tabular sources for the profiling pipeline.
//!
//! This crate turns external tabular inputs into an ordered column list plus a
//! restartable, bounded-memory stream of raw row values.
//!
//! # Features
//!
//! - **Delimited files**: multi-character delimiters, bookend (quote) handling,
//!   header/footer skipping, multi-row headers and any ASCII-compatible encoding
//! - **SQLite tables**: column introspection and key-ordered paged streaming
//! - **SQL helpers**: identifier quoting and deterministic table/column naming
//!
//! # Example
//!
//! ```ignore
//! use tabprof_ingest::{DsvOptions, DsvSource, Source};
//!
//! let source = DsvSource::open("orders.csv", DsvOptions::default().with_delimiter("|"))?;
//! for row in source.rows()? {
//!     let row = row?;
//!     println!("{row:?}");
//! }
//! ```

mod db;
mod dsv;
mod error;
mod source;
pub mod sql;

// === Error Types ===
pub use error::{IngestError, Result};

// === Source Abstraction ===
pub use source::{Record, RecordStream, Source};

// === Delimited Files ===
pub use dsv::{DsvOptions, DsvRows, DsvSource};

// === SQLite Tables ===
pub use db::{DbRows, DbSource, open_existing, parse_connection_target};
