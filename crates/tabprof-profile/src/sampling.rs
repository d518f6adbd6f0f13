//! Adaptive sample sizing and random row selection.

use rand::Rng;
use rand::seq::index;
use rusqlite::{Connection, params_from_iter};
use serde::{Deserialize, Serialize};
use tabprof_ingest::sql::quote_ident;

/// Upper bound on bound parameters per `IN (...)` fetch.
const FETCH_BATCH: usize = 500;

/// How many rows to sample for a table of a given size.
///
/// Tables up to `full_scan_threshold` rows are read in full. Above it the
/// sample grows by one row per `growth_divisor` extra rows, capped at
/// `max_sample`. The curve is monotone and continuous at the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingPolicy {
    pub full_scan_threshold: usize,
    pub growth_divisor: usize,
    pub max_sample: usize,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            full_scan_threshold: 10_000,
            growth_divisor: 20,
            max_sample: 50_000,
        }
    }
}

impl SamplingPolicy {
    pub fn sample_size(&self, total_rows: usize) -> usize {
        let threshold = self.full_scan_threshold;
        if total_rows <= threshold {
            return total_rows;
        }
        let growth = (total_rows - threshold) / self.growth_divisor.max(1);
        threshold
            .saturating_add(growth)
            .min(self.max_sample.max(threshold))
    }
}

/// Non-null, non-blank sampled values per column, trimmed.
pub(crate) type ColumnValues = Vec<Vec<String>>;

/// Reads `sample_size` uniformly chosen rows of `table` (all rows when the
/// sample covers the table).
///
/// `key` names an integer column that orders the rows. Without one the table
/// is scanned once and rows at the chosen positions are kept.
pub(crate) fn sample_values<R: Rng + ?Sized>(
    conn: &Connection,
    table: &str,
    key: Option<&str>,
    columns: &[&str],
    total_rows: usize,
    sample_size: usize,
    rng: &mut R,
) -> rusqlite::Result<ColumnValues> {
    let mut values: ColumnValues = vec![Vec::new(); columns.len()];
    if columns.is_empty() || total_rows == 0 || sample_size == 0 {
        return Ok(values);
    }
    let projection = columns
        .iter()
        .map(|name| quote_ident(name))
        .collect::<Vec<_>>()
        .join(", ");
    let table = quote_ident(table);

    if sample_size >= total_rows {
        let mut stmt = conn.prepare(&format!("SELECT {projection} FROM {table}"))?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            collect_row(row, &mut values)?;
        }
        return Ok(values);
    }

    let mut positions = index::sample(rng, total_rows, sample_size).into_vec();
    positions.sort_unstable();

    let Some(key) = key else {
        tracing::debug!(table = %table, "no row key, sampling by scan");
        let mut stmt = conn.prepare(&format!("SELECT {projection} FROM {table}"))?;
        let mut rows = stmt.query([])?;
        let mut wanted = positions.iter().peekable();
        let mut position = 0usize;
        while let Some(row) = rows.next()? {
            let Some(&&next) = wanted.peek() else {
                break;
            };
            if next == position {
                collect_row(row, &mut values)?;
                wanted.next();
            }
            position += 1;
        }
        return Ok(values);
    };

    let key = quote_ident(key);
    let keys = resolve_keys(conn, &table, &key, total_rows, &positions)?;

    for chunk in keys.chunks(FETCH_BATCH) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = format!("SELECT {projection} FROM {table} WHERE {key} IN ({placeholders})");
        let mut stmt = conn.prepare_cached(&sql)?;
        let mut rows = stmt.query(params_from_iter(chunk.iter()))?;
        while let Some(row) = rows.next()? {
            collect_row(row, &mut values)?;
        }
    }
    Ok(values)
}

fn collect_row(row: &rusqlite::Row<'_>, values: &mut ColumnValues) -> rusqlite::Result<()> {
    for (idx, column) in values.iter_mut().enumerate() {
        let value: Option<String> = row.get(idx)?;
        if let Some(value) = value {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                column.push(trimmed.to_string());
            }
        }
    }
    Ok(())
}

/// Maps sorted 0-based positions to row keys.
///
/// A freshly loaded table has contiguous keys, so positions map by offset.
/// Otherwise the key index is walked once.
fn resolve_keys(
    conn: &Connection,
    table: &str,
    key: &str,
    total_rows: usize,
    positions: &[usize],
) -> rusqlite::Result<Vec<i64>> {
    let (min, max): (Option<i64>, Option<i64>) = conn.query_row(
        &format!("SELECT MIN({key}), MAX({key}) FROM {table}"),
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    if let (Some(min), Some(max)) = (min, max) {
        let span = max
            .checked_sub(min)
            .and_then(|span| usize::try_from(span).ok())
            .map(|span| span + 1);
        if span == Some(total_rows) {
            return Ok(positions
                .iter()
                .filter_map(|&pos| i64::try_from(pos).ok())
                .map(|offset| min + offset)
                .collect());
        }
    }

    tracing::debug!(table = %table, "row keys are not contiguous, walking key index");
    let mut stmt = conn.prepare(&format!("SELECT {key} FROM {table} ORDER BY {key}"))?;
    let mut rows = stmt.query([])?;
    let mut wanted = positions.iter().peekable();
    let mut keys = Vec::with_capacity(positions.len());
    let mut position = 0usize;
    while let Some(row) = rows.next()? {
        let Some(&&next) = wanted.peek() else {
            break;
        };
        if next == position {
            keys.push(row.get(0)?);
            wanted.next();
        }
        position += 1;
    }
    Ok(keys)
}
