//! Shared vocabulary for the tabprof crates.
//!
//! - **data_type**: the closed set of semantic types a column can be inferred as
//! - **column**: per-column metadata carried by sources, staging stores and profilers
//! - **error**: the failure taxonomy every crate maps its errors onto

pub mod column;
pub mod data_type;
pub mod error;

pub use column::Column;
pub use data_type::DataType;
pub use error::ErrorKind;
