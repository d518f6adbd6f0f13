//! Staging store for the profiling pipeline.
//!
//! A [`DataLake`] is one SQLite file holding one all-TEXT table loaded from a
//! [`Source`](tabprof_ingest::Source). Values are stored exactly as the source
//! yielded them so type inference can run later against the full population.

mod builder;
mod error;
mod lake;
mod options;

pub use builder::DataLakeBuilder;
pub use error::{LakeError, Result};
pub use lake::{COLUMN_MAP_TABLE, DataLake, INFERRED_SUFFIX};
pub use options::{DEFAULT_BATCH_SIZE, LakeOptions};
