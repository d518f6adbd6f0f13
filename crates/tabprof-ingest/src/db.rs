//! SQLite table source.

use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, params};
use tabprof_model::{Column, DataType};

use crate::error::{IngestError, Result};
use crate::source::{Record, RecordStream, Source};
use crate::sql::{ROW_KEY, ROWID_ALIASES, qualified_table, quote_ident};

/// Rows fetched per page when streaming a table.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

const DEFAULT_SCHEMA: &str = "main";

/// Resolves a connection target to a database file path.
///
/// Accepts a bare path or a `sqlite://` URL. `sqlite:///data.db` is relative,
/// `sqlite:////tmp/data.db` is absolute.
pub fn parse_connection_target(target: &str) -> Result<PathBuf> {
    let target = target.trim();
    let path = target
        .strip_prefix("sqlite:///")
        .or_else(|| target.strip_prefix("sqlite://"))
        .unwrap_or(target);
    if path.is_empty() {
        return Err(IngestError::EmptyConnectionTarget);
    }
    Ok(PathBuf::from(path))
}

/// Opens an existing database file. Never creates one.
pub fn open_existing(path: &Path, read_only: bool) -> rusqlite::Result<Connection> {
    let access = if read_only {
        OpenFlags::SQLITE_OPEN_READ_ONLY
    } else {
        OpenFlags::SQLITE_OPEN_READ_WRITE
    };
    Connection::open_with_flags(path, access | OpenFlags::SQLITE_OPEN_NO_MUTEX)
}

/// Maps a declared column type to a [`DataType`] following SQLite's
/// substring-based affinity rules, with date and boolean names recognized.
fn declared_type(declared: &str) -> DataType {
    let upper = declared.to_ascii_uppercase();
    if upper.contains("INT") {
        DataType::Integer
    } else if upper.contains("BOOL") {
        DataType::Boolean
    } else if upper.contains("DATETIME") || upper.contains("TIMESTAMP") {
        DataType::DateTime
    } else if upper.contains("DATE") {
        DataType::Date
    } else if upper.contains("TIME") {
        DataType::Time
    } else if ["REAL", "FLOA", "DOUB", "NUMERIC", "DECIMAL"]
        .iter()
        .any(|token| upper.contains(token))
    {
        DataType::Float
    } else {
        DataType::Text
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Paging {
    /// Keyset pages over an integer key: [`ROW_KEY`] or an unshadowed rowid alias.
    Keyed(String),
    /// `LIMIT/OFFSET` pages for views, `WITHOUT ROWID` tables and tables whose
    /// columns shadow every rowid alias.
    Offset,
}

/// A source whose columns are introspected from an existing SQLite table.
#[derive(Clone)]
pub struct DbSource {
    target: String,
    path: PathBuf,
    schema: String,
    table: String,
    columns: Vec<Column>,
    paging: Paging,
    page_size: usize,
}

impl DbSource {
    /// Connects to `target` and introspects `schema.table` (schema defaults to `main`).
    pub fn new(target: &str, schema: Option<&str>, table: &str) -> Result<Self> {
        let path = parse_connection_target(target)?;
        Self::introspect_at(target.to_string(), path, schema, table)
    }

    /// Same as [`DbSource::new`] for a database file path.
    pub fn from_path(path: impl AsRef<Path>, schema: Option<&str>, table: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.as_os_str().is_empty() {
            return Err(IngestError::EmptyConnectionTarget);
        }
        Self::introspect_at(path.display().to_string(), path, schema, table)
    }

    fn introspect_at(
        target: String,
        path: PathBuf,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Self> {
        if table.trim().is_empty() {
            return Err(IngestError::EmptyTableName);
        }
        let schema = schema
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SCHEMA)
            .to_string();

        let unreachable = |source| IngestError::Unreachable {
            target: target.clone(),
            source,
        };
        let conn = open_existing(&path, true).map_err(unreachable)?;

        let schema_exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM pragma_database_list WHERE name = ?1)",
                params![schema],
                |row| row.get(0),
            )
            .map_err(unreachable)?;
        if !schema_exists {
            return Err(IngestError::TableNotFound {
                schema,
                table: table.to_string(),
            });
        }

        let (columns, has_row_key) = introspect(&conn, &schema, table).map_err(unreachable)?;
        if columns.is_empty() {
            return Err(IngestError::TableNotFound {
                schema,
                table: table.to_string(),
            });
        }

        let paging = if has_row_key {
            Paging::Keyed(ROW_KEY.to_string())
        } else {
            detect_paging(&conn, &schema, table, &columns)
        };

        tracing::debug!(
            target_db = %path.display(),
            schema = %schema,
            table = %table,
            columns = columns.len(),
            paging = ?paging,
            "introspected table"
        );

        Ok(Self {
            target,
            path,
            schema,
            table: table.to_string(),
            columns,
            paging,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Sets the number of rows fetched per page by [`DbSource::rows`].
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Database file backing the source.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Quoted `"schema"."table"` for use in SQL.
    pub fn qualified_name(&self) -> String {
        qualified_table(&self.schema, &self.table)
    }

    /// Integer key rows are streamed by, when the table has one.
    pub fn row_key(&self) -> Option<&str> {
        match &self.paging {
            Paging::Keyed(key) => Some(key),
            Paging::Offset => None,
        }
    }

    /// Opens a fresh connection to the backing database.
    pub fn connect(&self, read_only: bool) -> Result<Connection> {
        open_existing(&self.path, read_only).map_err(|source| IngestError::Connection {
            target: self.target.clone(),
            source,
        })
    }

    /// Current number of rows in the table.
    pub fn row_count(&self) -> Result<usize> {
        let conn = self.connect(true)?;
        let sql = format!("SELECT COUNT(*) FROM {}", self.qualified_name());
        let count: i64 = conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|source| self.query_error(source))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Streams every row as text in a stable order, one page at a time.
    pub fn rows(&self) -> Result<DbRows<'_>> {
        let conn = self.connect(true)?;
        let projection = self
            .columns
            .iter()
            .map(|column| format!("CAST({} AS TEXT)", quote_ident(column.name())))
            .collect::<Vec<_>>()
            .join(", ");
        let table = self.qualified_name();
        let (first_sql, next_sql) = match &self.paging {
            Paging::Keyed(key) => {
                let key = quote_ident(key);
                (
                    format!("SELECT {key}, {projection} FROM {table} ORDER BY {key} LIMIT ?1"),
                    format!(
                        "SELECT {key}, {projection} FROM {table} WHERE {key} > ?2 ORDER BY {key} LIMIT ?1"
                    ),
                )
            }
            Paging::Offset => (
                format!("SELECT {projection} FROM {table} LIMIT ?1"),
                format!("SELECT {projection} FROM {table} LIMIT ?1 OFFSET ?2"),
            ),
        };
        Ok(DbRows {
            source: self,
            conn,
            first_sql,
            next_sql,
            cursor: None,
            buffer: VecDeque::new(),
            exhausted: false,
        })
    }

    fn query_error(&self, source: rusqlite::Error) -> IngestError {
        IngestError::Query {
            table: self.table.clone(),
            source,
        }
    }
}

/// Keyset paging needs a real rowid, which views and `WITHOUT ROWID` tables
/// lack. A column named like an alias hides that alias, so the first free one
/// is used.
fn detect_paging(conn: &Connection, schema: &str, table: &str, columns: &[Column]) -> Paging {
    let master = format!("SELECT type FROM {}.sqlite_master WHERE name = ?1", quote_ident(schema));
    let is_table = conn
        .query_row(&master, params![table], |row| row.get::<_, String>(0))
        .is_ok_and(|kind| kind == "table");
    if !is_table {
        return Paging::Offset;
    }
    ROWID_ALIASES
        .iter()
        .find(|alias| {
            !columns
                .iter()
                .any(|column| column.name().eq_ignore_ascii_case(alias))
        })
        .filter(|alias| {
            let check = format!(
                "SELECT {alias} FROM {} LIMIT 0",
                qualified_table(schema, table)
            );
            conn.prepare(&check).is_ok()
        })
        .map_or(Paging::Offset, |alias| Paging::Keyed((*alias).to_string()))
}

/// Reads the column list, leaving out a [`ROW_KEY`] primary key. The flag
/// reports whether that key was found.
fn introspect(
    conn: &Connection,
    schema: &str,
    table: &str,
) -> rusqlite::Result<(Vec<Column>, bool)> {
    let mut stmt = conn.prepare(
        "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1, ?2) ORDER BY cid",
    )?;
    let mut columns = Vec::new();
    let mut has_row_key = false;
    let mut rows = stmt.query(params![table, schema])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(0)?;
        let declared: String = row.get(1)?;
        let not_null: bool = row.get(2)?;
        let pk: i64 = row.get(3)?;
        if name == ROW_KEY && pk == 1 && declared.eq_ignore_ascii_case("INTEGER") {
            has_row_key = true;
            continue;
        }
        columns.push(Column::with_raw_type(name, declared_type(&declared)).with_nullable(!not_null));
    }
    Ok((columns, has_row_key))
}

impl Source for DbSource {
    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn name_hint(&self) -> String {
        self.table.clone()
    }

    fn records(&self) -> Result<RecordStream<'_>> {
        Ok(Box::new(self.rows()?))
    }

    fn row_count_hint(&self) -> Option<usize> {
        match self.row_count() {
            Ok(count) => Some(count),
            Err(err) => {
                tracing::warn!(table = %self.table, error = %err, "row count unavailable");
                None
            }
        }
    }
}

impl PartialEq for DbSource {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

impl fmt::Debug for DbSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbSource")
            .field("target", &self.target)
            .field("schema", &self.schema)
            .field("table", &self.table)
            .field("columns", &self.columns)
            .finish()
    }
}

impl<'a> IntoIterator for &'a DbSource {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

/// Paged row iterator over a [`DbSource`]. Holds at most one page in memory.
pub struct DbRows<'a> {
    source: &'a DbSource,
    conn: Connection,
    first_sql: String,
    next_sql: String,
    /// Last key seen (keyed paging) or rows consumed (offset paging); unset
    /// before the first page.
    cursor: Option<i64>,
    buffer: VecDeque<Record>,
    exhausted: bool,
}

impl DbRows<'_> {
    fn fetch_page(&mut self) -> Result<()> {
        let page = i64::try_from(self.source.page_size).unwrap_or(i64::MAX);
        let width = self.source.columns.len();
        let keyed = matches!(self.source.paging, Paging::Keyed(_));
        let sql = if self.cursor.is_some() {
            &self.next_sql
        } else {
            &self.first_sql
        };
        let mut stmt = self
            .conn
            .prepare_cached(sql)
            .map_err(|e| self.source.query_error(e))?;
        let mut rows = match self.cursor {
            Some(cursor) => stmt.query(params![page, cursor]),
            None => stmt.query(params![page]),
        }
        .map_err(|e| self.source.query_error(e))?;

        let offset = usize::from(keyed);
        let mut fetched = 0i64;
        let mut last_key = None;
        while let Some(row) = rows.next().map_err(|e| self.source.query_error(e))? {
            if keyed {
                last_key = Some(row.get::<_, i64>(0).map_err(|e| self.source.query_error(e))?);
            }
            let mut record = Vec::with_capacity(width);
            for idx in 0..width {
                let value: Option<String> = row
                    .get(idx + offset)
                    .map_err(|e| self.source.query_error(e))?;
                record.push(value);
            }
            self.buffer.push_back(record);
            fetched += 1;
        }

        self.cursor = if keyed {
            last_key.or(self.cursor)
        } else {
            Some(self.cursor.unwrap_or(0) + fetched)
        };
        if fetched < page {
            self.exhausted = true;
        }
        Ok(())
    }
}

impl Iterator for DbRows<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(err) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(err));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_connection_target() {
        assert_eq!(
            parse_connection_target("data/lake.sqlite").unwrap(),
            PathBuf::from("data/lake.sqlite")
        );
        assert_eq!(
            parse_connection_target("sqlite:///lake.sqlite").unwrap(),
            PathBuf::from("lake.sqlite")
        );
        assert_eq!(
            parse_connection_target("sqlite:////tmp/lake.sqlite").unwrap(),
            PathBuf::from("/tmp/lake.sqlite")
        );
    }

    #[test]
    fn test_blank_target_is_rejected() {
        assert!(matches!(
            parse_connection_target("  "),
            Err(IngestError::EmptyConnectionTarget)
        ));
        assert!(matches!(
            parse_connection_target("sqlite:///"),
            Err(IngestError::EmptyConnectionTarget)
        ));
    }

    #[test]
    fn test_declared_type_affinity() {
        assert_eq!(declared_type("INTEGER"), DataType::Integer);
        assert_eq!(declared_type("bigint"), DataType::Integer);
        assert_eq!(declared_type("VARCHAR(20)"), DataType::Text);
        assert_eq!(declared_type(""), DataType::Text);
        assert_eq!(declared_type("DOUBLE PRECISION"), DataType::Float);
        assert_eq!(declared_type("NUMERIC(10,2)"), DataType::Float);
        assert_eq!(declared_type("BOOLEAN"), DataType::Boolean);
        assert_eq!(declared_type("DATE"), DataType::Date);
        assert_eq!(declared_type("TIME"), DataType::Time);
        assert_eq!(declared_type("DATETIME"), DataType::DateTime);
        assert_eq!(declared_type("TIMESTAMP"), DataType::DateTime);
    }
}
