//! Error types for tabular sources.

use std::path::PathBuf;

use tabprof_model::ErrorKind;
use thiserror::Error;

/// Errors that can occur while constructing or reading a source.
#[derive(Debug, Error)]
pub enum IngestError {
    // === Delimited File Configuration ===
    /// Delimited file does not exist.
    #[error("delimited file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Delimited file has no content at all.
    #[error("delimited file is empty: {path}")]
    EmptyFile { path: PathBuf },

    /// The delimiter was configured as an empty string.
    #[error("delimiter must not be empty")]
    EmptyDelimiter,

    /// At least one header row is required to name the columns.
    #[error("header_rows must be at least 1, got {header_rows}")]
    InvalidHeaderRows { header_rows: usize },

    /// The configured encoding label is unknown or cannot be streamed by line.
    #[error("unsupported encoding: {encoding}")]
    UnsupportedEncoding { encoding: String },

    /// Skip and header counts need more rows than the file has.
    #[error("{path} has {available} rows but the configuration consumes {requested}")]
    SkipExceedsRows {
        path: PathBuf,
        requested: usize,
        available: usize,
    },

    // === Delimited File Reading ===
    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bytes on a line are not valid in the configured encoding.
    #[error("line {line} of {path} is not valid {encoding}")]
    Decode {
        path: PathBuf,
        line: usize,
        encoding: &'static str,
    },

    /// A data row has more fields than the header names.
    #[error("line {line} of {path} has {found} fields but only {expected} columns")]
    RowTooWide {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    // === Relational Configuration ===
    /// Connection target string is blank.
    #[error("connection target must not be empty")]
    EmptyConnectionTarget,

    /// Table name is blank.
    #[error("table name must not be empty")]
    EmptyTableName,

    /// Database could not be opened while constructing a source.
    #[error("cannot open database {target}: {source}")]
    Unreachable {
        target: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Table (or its schema) does not exist in the database.
    #[error("table {table} not found in schema {schema}")]
    TableNotFound { schema: String, table: String },

    // === Relational Reading ===
    /// Database could not be opened after construction.
    #[error("lost connection to {target}: {source}")]
    Connection {
        target: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Query against an introspected table failed.
    #[error("query on {table} failed: {source}")]
    Query {
        table: String,
        #[source]
        source: rusqlite::Error,
    },
}

impl IngestError {
    /// Failure category for pipeline branching.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound { .. }
            | Self::EmptyFile { .. }
            | Self::EmptyDelimiter
            | Self::InvalidHeaderRows { .. }
            | Self::UnsupportedEncoding { .. }
            | Self::SkipExceedsRows { .. }
            | Self::EmptyConnectionTarget
            | Self::EmptyTableName
            | Self::Unreachable { .. }
            | Self::TableNotFound { .. } => ErrorKind::Configuration,
            Self::FileRead { .. } | Self::Decode { .. } => ErrorKind::Io,
            Self::RowTooWide { .. } => ErrorKind::Integrity,
            Self::Connection { .. } | Self::Query { .. } => ErrorKind::Connectivity,
        }
    }
}

/// Result type for source operations.
pub type Result<T> = std::result::Result<T, IngestError>;
