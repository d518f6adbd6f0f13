//! Sampling-based type inference and inferred-table materialization.

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tabprof_ingest::open_existing;
use tabprof_ingest::sql::{quote_ident, unique_names};
use tabprof_lake::DataLake;
use tabprof_model::{Column, DataType};
use tracing::{debug, info, info_span};

use crate::cast::{CAST_SUFFIX, cast_expression, register_functions, sql_type};
use crate::classifier::{StandardClassifier, ValueClassifier};
use crate::error::{ProfileError, Result};
use crate::report::{ColumnProfile, ProfileReport};
use crate::sampling::{SamplingPolicy, sample_values};

/// Profiling configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    pub sampling: SamplingPolicy,
    /// Fixes the random sample. Entropy-seeded when unset.
    pub seed: Option<u64>,
}

impl ProfilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sampling(mut self, sampling: SamplingPolicy) -> Self {
        self.sampling = sampling;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct SampleStats {
    row_count: usize,
    sample_size: usize,
}

/// Infers column types of a [`DataLake`] and materializes the typed table.
///
/// The profiler works on its own copy of the lake's columns; the lake's
/// metadata and raw table are never modified.
pub struct Profiler<'a, C = StandardClassifier> {
    lake: &'a DataLake,
    columns: Vec<Column>,
    config: ProfilerConfig,
    classifier: C,
    stats: Option<SampleStats>,
}

impl<'a> Profiler<'a> {
    pub fn new(lake: &'a DataLake) -> Self {
        Self {
            lake,
            columns: lake
                .columns()
                .iter()
                .map(|column| column.clone().with_inferred_type(DataType::Text))
                .collect(),
            config: ProfilerConfig::default(),
            classifier: StandardClassifier,
            stats: None,
        }
    }
}

impl<'a, C: ValueClassifier> Profiler<'a, C> {
    #[must_use]
    pub fn with_config(mut self, config: ProfilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Swaps the value classifier.
    pub fn with_classifier<D: ValueClassifier>(self, classifier: D) -> Profiler<'a, D> {
        Profiler {
            lake: self.lake,
            columns: self.columns,
            config: self.config,
            classifier,
            stats: self.stats,
        }
    }

    pub fn lake(&self) -> &DataLake {
        self.lake
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    /// Working copy of the columns with the latest verdicts.
    pub fn profiled_columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn is_profiled(&self) -> bool {
        self.stats.is_some()
    }

    /// Samples the staging table and sets every column's inferred type.
    ///
    /// `sample_size` defaults to the adaptive size from the configured
    /// [`SamplingPolicy`]; explicit sizes above the row count read every row.
    /// Only non-null, non-blank values are classified. A column without any
    /// such value is `TEXT`.
    pub fn profile(&mut self, sample_size: Option<usize>) -> Result<()> {
        if sample_size == Some(0) {
            return Err(ProfileError::InvalidSampleSize);
        }
        let table = self.lake.table_name().to_string();
        let span = info_span!("profile", table = %table);
        span.in_scope(|| -> Result<()> {
            let start = Instant::now();
            let conn = self.connect(true)?;
            let row_count = count_rows(&conn, &table)?;
            let sample_size = sample_size.map_or_else(
                || self.config.sampling.sample_size(row_count),
                |requested| requested.min(row_count),
            );

            let mut rng = match self.config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let names: Vec<&str> = self.columns.iter().map(Column::name).collect();
            let key = self.lake.raw_source().row_key();
            let values = sample_values(
                &conn,
                &table,
                key,
                &names,
                row_count,
                sample_size,
                &mut rng,
            )
            .map_err(|e| query_error(&table, e))?;

            for (column, values) in self.columns.iter_mut().zip(values) {
                let refs: Vec<&str> = values.iter().map(String::as_str).collect();
                let verdict = self.classifier.classify(&refs);
                debug!(
                    column = %column.name(),
                    non_null = refs.len(),
                    inferred_type = %verdict,
                    "column classified"
                );
                column.set_inferred_type(verdict);
            }
            self.stats = Some(SampleStats {
                row_count,
                sample_size,
            });

            info!(
                table = %table,
                row_count,
                sample_size,
                typed_columns = self.columns.iter().filter(|c| c.inferred_type().is_specific()).count(),
                duration_ms = start.elapsed().as_millis(),
                "profiling complete"
            );
            Ok(())
        })
    }

    /// Creates `<table>_inferred` holding each column followed by its cast to
    /// the inferred type, and returns its name.
    ///
    /// The table is dropped and recreated on every call. Creation, the single
    /// `INSERT ... SELECT` and the row-count check share one transaction, so a
    /// failure leaves no partial table behind.
    pub fn create_inferred_table(&self) -> Result<String> {
        let raw = self.lake.table_name();
        if self.stats.is_none() {
            return Err(ProfileError::NotProfiled {
                table: raw.to_string(),
            });
        }
        let inferred = self.lake.inferred_table_name();
        let span = info_span!("materialize", table = %inferred);
        span.in_scope(|| -> Result<String> {
            let start = Instant::now();
            let mut conn = self.connect(false)?;
            register_functions(&conn).map_err(|e| query_error(&inferred, e))?;

            let (definitions, targets, projections) = self.inferred_layout();
            let create = format!(
                "DROP TABLE IF EXISTS {table};\nCREATE TABLE {table} ({definitions});",
                table = quote_ident(&inferred),
                definitions = definitions.join(", "),
            );
            let order = self
                .lake
                .raw_source()
                .row_key()
                .map(|key| format!(" ORDER BY {}", quote_ident(key)))
                .unwrap_or_default();
            let insert = format!(
                "INSERT INTO {} ({}) SELECT {} FROM {}{order}",
                quote_ident(&inferred),
                targets.join(", "),
                projections.join(", "),
                quote_ident(raw),
            );

            let tx = conn.transaction().map_err(|e| query_error(&inferred, e))?;
            tx.execute_batch(&create)
                .map_err(|e| query_error(&inferred, e))?;
            let inserted = tx
                .execute(&insert, [])
                .map_err(|e| query_error(&inferred, e))?;
            let expected = count_rows(&tx, raw)?;
            let actual = count_rows(&tx, &inferred)?;
            if actual != expected || inserted != expected {
                return Err(ProfileError::RowCountMismatch {
                    table: inferred.clone(),
                    expected,
                    actual,
                });
            }
            tx.commit().map_err(|e| query_error(&inferred, e))?;

            info!(
                table = %inferred,
                rows = actual,
                columns = targets.len(),
                duration_ms = start.elapsed().as_millis(),
                "inferred table created"
            );
            Ok(inferred.clone())
        })
    }

    /// Summary of the last profiling pass.
    pub fn report(&self) -> Result<ProfileReport> {
        let stats = self.stats.ok_or_else(|| ProfileError::NotProfiled {
            table: self.lake.table_name().to_string(),
        })?;
        Ok(ProfileReport {
            table: self.lake.table_name().to_string(),
            row_count: stats.row_count,
            sample_size: stats.sample_size,
            columns: self
                .columns
                .iter()
                .zip(self.lake.source_names())
                .map(|(column, source_name)| {
                    ColumnProfile::from(column).with_source_name(source_name)
                })
                .collect(),
        })
    }

    fn connect(&self, read_only: bool) -> Result<Connection> {
        let path = self.lake.db_path();
        open_existing(path, read_only).map_err(|source| ProfileError::Connection {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Column definitions, insert targets and select projections. Original
    /// names are kept; cast names are `<name>_cast`, suffixed further on a
    /// clash.
    fn inferred_layout(&self) -> (Vec<String>, Vec<String>, Vec<String>) {
        let originals: Vec<&str> = self.columns.iter().map(Column::name).collect();
        let wanted_casts: Vec<String> = originals
            .iter()
            .map(|name| format!("{name}{CAST_SUFFIX}"))
            .collect();
        let all = unique_names(
            originals
                .iter()
                .copied()
                .chain(wanted_casts.iter().map(String::as_str)),
        );
        let casts = &all[originals.len()..];

        let mut definitions = Vec::with_capacity(originals.len() * 2);
        let mut targets = Vec::with_capacity(originals.len() * 2);
        let mut projections = Vec::with_capacity(originals.len() * 2);
        for ((column, original), cast) in self.columns.iter().zip(&originals).zip(casts) {
            let inferred = column.inferred_type();
            definitions.push(format!("{} TEXT", quote_ident(original)));
            definitions.push(format!("{} {}", quote_ident(cast), sql_type(inferred)));
            targets.push(quote_ident(original));
            targets.push(quote_ident(cast));
            projections.push(quote_ident(original));
            projections.push(cast_expression(original, inferred));
        }
        (definitions, targets, projections)
    }
}

fn count_rows(conn: &Connection, table: &str) -> Result<usize> {
    let count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {}", quote_ident(table)), [], |row| {
            row.get(0)
        })
        .map_err(|e| query_error(table, e))?;
    Ok(usize::try_from(count).unwrap_or(0))
}

fn query_error(table: &str, source: rusqlite::Error) -> ProfileError {
    ProfileError::Query {
        table: table.to_string(),
        source,
    }
}
