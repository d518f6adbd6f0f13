//! Error types for building and reading the staging store.

use std::path::PathBuf;

use tabprof_ingest::IngestError;
use tabprof_model::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LakeError {
    #[error("batch size must be at least 1")]
    InvalidBatchSize,

    #[error("source {name} has no columns")]
    NoColumns { name: String },

    #[error("failed to create lake directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open lake database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to write table {table}: {source}")]
    Write {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Rows in the staging table disagree with what the source produced.
    #[error("table {table} holds {actual} rows, expected {expected}")]
    RowCountMismatch {
        table: String,
        expected: usize,
        actual: usize,
    },

    /// A source record carries more values than the source has columns.
    #[error("row {row} of {table} has {found} values for {expected} columns")]
    RecordTooWide {
        table: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Source(#[from] IngestError),
}

impl LakeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidBatchSize | Self::NoColumns { .. } => ErrorKind::Configuration,
            Self::CreateDir { .. } | Self::Open { .. } => ErrorKind::Io,
            Self::Write { .. } => ErrorKind::Connectivity,
            Self::RowCountMismatch { .. } | Self::RecordTooWide { .. } => ErrorKind::Integrity,
            Self::Source(err) => err.kind(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LakeError>;
