//! Column type inference over a staging table.
//!
//! The [`Profiler`] draws a random sample from a [`DataLake`](tabprof_lake::DataLake),
//! hands each column's non-null values to a [`ValueClassifier`], and can then
//! materialize `<table>_inferred` with every column next to its typed cast.
//!
//! # Example
//!
//! ```ignore
//! use tabprof_ingest::DsvSource;
//! use tabprof_lake::DataLakeBuilder;
//! use tabprof_profile::Profiler;
//!
//! let source = DsvSource::new("orders.csv")?;
//! let lake = DataLakeBuilder::new("lake").build(&source)?;
//! let mut profiler = Profiler::new(&lake);
//! profiler.profile(None)?;
//! let table = profiler.create_inferred_table()?;
//! ```

pub mod cast;
mod classifier;
mod error;
pub mod formats;
mod profiler;
mod report;
mod sampling;

pub use classifier::{StandardClassifier, ValueClassifier, merge_types};
pub use error::{ProfileError, Result};
pub use profiler::{Profiler, ProfilerConfig};
pub use report::{ColumnProfile, ProfileReport};
pub use sampling::SamplingPolicy;
