//! Error types for profiling and materialization.

use std::path::PathBuf;

use tabprof_model::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    /// An explicit sample size of zero.
    #[error("sample size must be at least 1")]
    InvalidSampleSize,

    /// The inferred table was requested before any profiling pass.
    #[error("table {table} has not been profiled yet")]
    NotProfiled { table: String },

    /// The lake database cannot be opened.
    #[error("cannot connect to lake database {path}: {source}")]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A statement against the lake database failed.
    #[error("query on {table} failed: {source}")]
    Query {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    /// The inferred table does not have the same number of rows as the raw table.
    #[error("table {table} holds {actual} rows, expected {expected}")]
    RowCountMismatch {
        table: String,
        expected: usize,
        actual: usize,
    },
}

impl ProfileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSampleSize | Self::NotProfiled { .. } => ErrorKind::Configuration,
            Self::Connection { .. } | Self::Query { .. } => ErrorKind::Connectivity,
            Self::RowCountMismatch { .. } => ErrorKind::Integrity,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProfileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(ProfileError::InvalidSampleSize.kind(), ErrorKind::Configuration);
        let err = ProfileError::NotProfiled {
            table: "orders".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.to_string(), "table orders has not been profiled yet");
        let err = ProfileError::RowCountMismatch {
            table: "orders_inferred".to_string(),
            expected: 3,
            actual: 0,
        };
        assert_eq!(err.kind(), ErrorKind::Integrity);
    }
}
