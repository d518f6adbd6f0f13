//! Streams a source into a fresh all-TEXT staging table.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rusqlite::{Connection, params, params_from_iter};
use tabprof_ingest::sql::{ROW_KEY, quote_ident, sanitize_identifier, unique_names_avoiding};
use tabprof_ingest::{DbSource, Record, Source};
use tabprof_model::Column;
use tracing::{debug, info, info_span, warn};

use crate::error::{LakeError, Result};
use crate::lake::{COLUMN_MAP_TABLE, DataLake, INFERRED_SUFFIX, db_file};
use crate::options::LakeOptions;

/// Builds [`DataLake`]s under one directory.
#[derive(Debug, Clone)]
pub struct DataLakeBuilder {
    location: PathBuf,
    options: LakeOptions,
}

impl DataLakeBuilder {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            options: LakeOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: LakeOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.options.batch_size = batch_size;
        self
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn options(&self) -> &LakeOptions {
        &self.options
    }

    /// Loads `source` into `<location>/<table>.sqlite`.
    ///
    /// An existing table of the same name is dropped first, together with its
    /// inferred table. Rows are committed `batch_size` at a time. If the load
    /// fails or the final row count disagrees with the source, the partial
    /// table is dropped before the error is returned.
    pub fn build(&self, source: &dyn Source) -> Result<DataLake> {
        if self.options.batch_size == 0 {
            return Err(LakeError::InvalidBatchSize);
        }
        let hint = source.name_hint();
        if source.is_empty() {
            return Err(LakeError::NoColumns { name: hint });
        }
        let table = self
            .options
            .table_name
            .as_deref()
            .map_or_else(|| sanitize_identifier(&hint), sanitize_identifier);

        fs::create_dir_all(&self.location).map_err(|e| LakeError::CreateDir {
            path: self.location.clone(),
            source: e,
        })?;
        let db_path = db_file(&self.location, &table);

        let span = info_span!("load", table = %table, db = %db_path.display());
        span.in_scope(|| -> Result<DataLake> {
            let start = Instant::now();
            let mut conn = Connection::open(&db_path).map_err(|e| LakeError::Open {
                path: db_path.clone(),
                source: e,
            })?;

            let source_names: Vec<String> =
                source.iter().map(|c| c.name().to_string()).collect();
            let names = unique_names_avoiding(source.iter().map(Column::name), &[ROW_KEY]);
            create_table(&mut conn, &table, &names, &source_names)?;

            let loaded = load_rows(&mut conn, &table, source, &names, self.options.batch_size)
                .and_then(|written| verify_count(&conn, &table, written, source.row_count_hint()));
            let rows = match loaded {
                Ok(rows) => rows,
                Err(err) => {
                    discard(&conn, &table);
                    return Err(err);
                }
            };
            drop(conn);

            let raw_source = DbSource::from_path(&db_path, None, &table)?;
            info!(
                table = %table,
                rows,
                columns = names.len(),
                duration_ms = start.elapsed().as_millis(),
                "staging table loaded"
            );
            Ok(DataLake::from_parts(
                self.location.clone(),
                db_path.clone(),
                raw_source,
                source_names,
            ))
        })
    }
}

/// Recreates the staging table behind a hidden [`ROW_KEY`] and records the
/// source's column names in [`COLUMN_MAP_TABLE`].
fn create_table(
    conn: &mut Connection,
    table: &str,
    names: &[String],
    source_names: &[String],
) -> Result<()> {
    let columns = names
        .iter()
        .map(|name| format!("{} TEXT", quote_ident(name)))
        .collect::<Vec<_>>()
        .join(", ");
    let inferred = format!("{table}{INFERRED_SUFFIX}");
    let map = quote_ident(COLUMN_MAP_TABLE);
    let sql = format!(
        "DROP TABLE IF EXISTS {inferred};
         DROP TABLE IF EXISTS {raw};
         CREATE TABLE {raw} ({key} INTEGER PRIMARY KEY, {columns});
         CREATE TABLE IF NOT EXISTS {map} (
             table_name TEXT NOT NULL,
             position INTEGER NOT NULL,
             source_name TEXT NOT NULL,
             column_name TEXT NOT NULL,
             PRIMARY KEY (table_name, position)
         );",
        inferred = quote_ident(&inferred),
        raw = quote_ident(table),
        key = quote_ident(ROW_KEY),
    );
    let tx = conn.transaction().map_err(|e| write_error(table, e))?;
    tx.execute_batch(&sql).map_err(|e| write_error(table, e))?;
    tx.execute(
        &format!("DELETE FROM {map} WHERE table_name = ?1"),
        params![table],
    )
    .map_err(|e| write_error(table, e))?;
    {
        let mut stmt = tx
            .prepare(&format!("INSERT INTO {map} VALUES (?1, ?2, ?3, ?4)"))
            .map_err(|e| write_error(table, e))?;
        for (position, (source_name, name)) in source_names.iter().zip(names).enumerate() {
            let position = i64::try_from(position).unwrap_or(i64::MAX);
            stmt.execute(params![table, position, source_name, name])
                .map_err(|e| write_error(table, e))?;
        }
    }
    tx.commit().map_err(|e| write_error(table, e))
}

fn load_rows(
    conn: &mut Connection,
    table: &str,
    source: &dyn Source,
    names: &[String],
    batch_size: usize,
) -> Result<usize> {
    let width = names.len();
    let placeholders = (1..=width)
        .map(|idx| format!("?{idx}"))
        .collect::<Vec<_>>()
        .join(", ");
    let targets = names
        .iter()
        .map(|name| quote_ident(name))
        .collect::<Vec<_>>()
        .join(", ");
    let insert = format!(
        "INSERT INTO {} ({targets}) VALUES ({placeholders})",
        quote_ident(table)
    );

    let mut written = 0usize;
    let mut batch: Vec<Record> = Vec::with_capacity(batch_size);
    for record in source.records()? {
        let mut record = record?;
        if record.len() > width {
            return Err(LakeError::RecordTooWide {
                table: table.to_string(),
                row: written + batch.len() + 1,
                expected: width,
                found: record.len(),
            });
        }
        if record.len() < width {
            debug!(
                table = %table,
                row = written + batch.len() + 1,
                expected = width,
                found = record.len(),
                "short record padded with NULL"
            );
            record.resize(width, None);
        }
        batch.push(record);
        if batch.len() == batch_size {
            written += write_batch(conn, table, &insert, &mut batch)?;
        }
    }
    if !batch.is_empty() {
        written += write_batch(conn, table, &insert, &mut batch)?;
    }
    Ok(written)
}

fn write_batch(
    conn: &mut Connection,
    table: &str,
    insert: &str,
    batch: &mut Vec<Record>,
) -> Result<usize> {
    let tx = conn.transaction().map_err(|e| write_error(table, e))?;
    {
        let mut stmt = tx.prepare_cached(insert).map_err(|e| write_error(table, e))?;
        for record in batch.iter() {
            stmt.execute(params_from_iter(record.iter()))
                .map_err(|e| write_error(table, e))?;
        }
    }
    tx.commit().map_err(|e| write_error(table, e))?;
    let count = batch.len();
    batch.clear();
    debug!(table = %table, rows = count, "batch committed");
    Ok(count)
}

fn verify_count(
    conn: &Connection,
    table: &str,
    written: usize,
    hint: Option<usize>,
) -> Result<usize> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
    let actual: i64 = conn
        .query_row(&sql, [], |row| row.get(0))
        .map_err(|e| write_error(table, e))?;
    let actual = usize::try_from(actual).unwrap_or(0);
    let expected = hint.unwrap_or(written);
    if actual != written || actual != expected {
        return Err(LakeError::RowCountMismatch {
            table: table.to_string(),
            expected: expected.max(written),
            actual,
        });
    }
    Ok(actual)
}

/// Drops a partially loaded table and its column map. Failures are logged,
/// the load error wins.
fn discard(conn: &Connection, table: &str) {
    let drop_table = format!("DROP TABLE IF EXISTS {}", quote_ident(table));
    let unmap = format!(
        "DELETE FROM {} WHERE table_name = ?1",
        quote_ident(COLUMN_MAP_TABLE)
    );
    let result = conn
        .execute_batch(&drop_table)
        .and_then(|()| conn.execute(&unmap, params![table]).map(|_| ()));
    if let Err(err) = result {
        warn!(table = %table, error = %err, "failed to drop partial staging table");
    }
}

fn write_error(table: &str, source: rusqlite::Error) -> LakeError {
    LakeError::Write {
        table: table.to_string(),
        source,
    }
}
