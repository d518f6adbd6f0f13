//! The staging store handle.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};
use tabprof_ingest::sql::quote_ident;
use tabprof_ingest::{DbSource, Source};
use tabprof_model::Column;

use crate::error::{LakeError, Result};

/// Suffix of the typed table materialized next to the raw table.
pub const INFERRED_SUFFIX: &str = "_inferred";

/// Lake table mapping each staging column to the name its source gave it.
pub const COLUMN_MAP_TABLE: &str = "_tabprof_columns";

/// A loaded staging table: `<location>/<table>.sqlite`, every column TEXT.
///
/// `raw_source` is a [`DbSource`] over the staging table, so its columns are
/// the physical column names with `raw_type` TEXT. SQLite compares names
/// case-insensitively, which forces renames such as `ID` to `ID_1`; the
/// names as the source spelled them are kept in [`COLUMN_MAP_TABLE`] and
/// exposed by [`DataLake::source_names`].
#[derive(Debug, Clone)]
pub struct DataLake {
    location: PathBuf,
    db_path: PathBuf,
    table: String,
    raw_source: DbSource,
    source_names: Vec<String>,
}

impl DataLake {
    /// Reattaches to a staging table built by an earlier run.
    pub fn open(location: impl AsRef<Path>, table: &str) -> Result<Self> {
        let location = location.as_ref().to_path_buf();
        let db_path = db_file(&location, table);
        let raw_source = DbSource::from_path(&db_path, None, table)?;
        let conn = raw_source.connect(true)?;
        let source_names =
            read_source_names(&conn, table, raw_source.columns()).map_err(|e| LakeError::Open {
                path: db_path.clone(),
                source: e,
            })?;
        Ok(Self::from_parts(location, db_path, raw_source, source_names))
    }

    pub(crate) fn from_parts(
        location: PathBuf,
        db_path: PathBuf,
        raw_source: DbSource,
        source_names: Vec<String>,
    ) -> Self {
        Self {
            location,
            db_path,
            table: raw_source.table().to_string(),
            raw_source,
            source_names,
        }
    }

    /// Directory holding the lake database.
    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// `<table>_inferred`.
    pub fn inferred_table_name(&self) -> String {
        format!("{}{INFERRED_SUFFIX}", self.table)
    }

    pub fn raw_source(&self) -> &DbSource {
        &self.raw_source
    }

    pub fn columns(&self) -> &[Column] {
        self.raw_source.columns()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns().iter().map(Column::name).collect()
    }

    /// Column names as the source spelled them, one per staging column.
    pub fn source_names(&self) -> &[String] {
        &self.source_names
    }

    /// Current row count of the staging table.
    pub fn row_count(&self) -> Result<usize> {
        Ok(self.raw_source.row_count()?)
    }

    /// Opens a connection to the lake database. Fails if the file is gone.
    pub fn connect(&self, read_only: bool) -> Result<Connection> {
        Ok(self.raw_source.connect(read_only)?)
    }
}

/// Source names recorded for `table`, or the physical names when the lake
/// predates the map or the map does not match the table.
fn read_source_names(
    conn: &Connection,
    table: &str,
    columns: &[Column],
) -> rusqlite::Result<Vec<String>> {
    let physical = || -> Vec<String> { columns.iter().map(|c| c.name().to_string()).collect() };
    let has_map = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![COLUMN_MAP_TABLE],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if !has_map {
        return Ok(physical());
    }
    let sql = format!(
        "SELECT source_name FROM {} WHERE table_name = ?1 ORDER BY position",
        quote_ident(COLUMN_MAP_TABLE)
    );
    let mut stmt = conn.prepare(&sql)?;
    let names = stmt
        .query_map(params![table], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    if names.len() == columns.len() {
        Ok(names)
    } else {
        tracing::debug!(table = %table, "column map does not match table, using physical names");
        Ok(physical())
    }
}

pub(crate) fn db_file(location: &Path, table: &str) -> PathBuf {
    location.join(format!("{table}.sqlite"))
}
