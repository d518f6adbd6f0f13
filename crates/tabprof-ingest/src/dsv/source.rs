//! Delimited-file source with construction-time validation.

use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use tabprof_model::Column;

use crate::error::{IngestError, Result};
use crate::source::{RecordStream, Source};

use super::options::DsvOptions;
use super::reader::{RecordReader, open_file, resolve_encoding};
use super::tokenizer::is_blank;

/// A source whose columns come from the header row(s) of a delimited file.
///
/// Construction reads the file once, start to end, to validate the skip
/// counts and count data rows; rows are never held in memory.
#[derive(Clone)]
pub struct DsvSource {
    path: PathBuf,
    options: DsvOptions,
    encoding: &'static Encoding,
    columns: Vec<Column>,
    data_rows: usize,
}

/// Header rows plus the number of records consumed to reach them.
struct Preamble {
    headers: Vec<Vec<String>>,
    records_read: usize,
}

/// How far the preamble got before the file ran out.
struct Shortfall {
    records: usize,
    non_blank: usize,
}

impl DsvSource {
    /// Opens `path` with default options.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path, DsvOptions::default())
    }

    /// Opens `path`, validating the configuration against the file.
    pub fn open(path: impl AsRef<Path>, options: DsvOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if options.delimiter.is_empty() {
            return Err(IngestError::EmptyDelimiter);
        }
        if options.header_rows == 0 {
            return Err(IngestError::InvalidHeaderRows {
                header_rows: options.header_rows,
            });
        }
        let encoding = resolve_encoding(&options.encoding)?;

        let metadata = open_file(&path)?
            .metadata()
            .map_err(|e| IngestError::FileRead {
                path: path.clone(),
                source: e,
            })?;
        if metadata.len() == 0 {
            return Err(IngestError::EmptyFile { path });
        }

        let mut reader = RecordReader::open(&path, &options, encoding)?;
        let preamble = match read_preamble(&mut reader, &options)? {
            Ok(preamble) => preamble,
            Err(shortfall) => return Err(exhausted(&path, &options, &shortfall)),
        };

        let mut data_rows = 0usize;
        while let Some(record) = reader.next_record()? {
            if options.skip_empty_rows && is_blank(&record) {
                continue;
            }
            data_rows += 1;
        }
        let footer = options.trailing_skip();
        if footer > data_rows {
            return Err(IngestError::SkipExceedsRows {
                path,
                requested: preamble.records_read + footer,
                available: preamble.records_read + data_rows,
            });
        }

        let columns = column_names(&preamble.headers)
            .into_iter()
            .map(Column::new)
            .collect::<Vec<_>>();

        tracing::debug!(
            path = %path.display(),
            columns = columns.len(),
            rows = data_rows - footer,
            encoding = encoding.name(),
            "opened delimited source"
        );

        Ok(Self {
            path,
            options,
            encoding,
            columns,
            data_rows: data_rows - footer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &DsvOptions {
        &self.options
    }

    /// Number of data rows `rows()` yields (after header, footer and empty-row skipping).
    pub fn data_row_count(&self) -> usize {
        self.data_rows
    }

    /// Starts a new pass over the data rows.
    ///
    /// Each row has exactly one value per column. Short rows are padded with
    /// empty strings. A row with surplus fields is an error unless
    /// `truncate_long_rows` is set.
    pub fn rows(&self) -> Result<DsvRows> {
        let mut reader = RecordReader::open(&self.path, &self.options, self.encoding)?;
        if let Err(shortfall) = read_preamble(&mut reader, &self.options)? {
            return Err(exhausted(&self.path, &self.options, &shortfall));
        }
        Ok(DsvRows {
            reader,
            path: self.path.clone(),
            width: self.columns.len(),
            skip_empty: self.options.skip_empty_rows,
            truncate: self.options.truncate_long_rows,
            footer: self.options.trailing_skip(),
            pending: VecDeque::new(),
            done: false,
        })
    }
}

/// Skips leading rows and collects the header rows, or reports how far it
/// got when the file runs out first.
fn read_preamble(
    reader: &mut RecordReader,
    options: &DsvOptions,
) -> Result<std::result::Result<Preamble, Shortfall>> {
    let mut records = 0usize;
    let mut non_blank = 0usize;
    let mut headers = Vec::with_capacity(options.header_rows);

    while headers.len() < options.header_rows {
        let Some(record) = reader.next_record()? else {
            return Ok(Err(Shortfall { records, non_blank }));
        };
        records += 1;
        let blank = is_blank(&record);
        if !blank {
            non_blank += 1;
        }
        if records <= options.leading_skip() || (blank && options.skip_empty_rows) {
            continue;
        }
        headers.push(record);
    }

    Ok(Ok(Preamble {
        headers,
        records_read: records,
    }))
}

fn exhausted(path: &Path, options: &DsvOptions, shortfall: &Shortfall) -> IngestError {
    if shortfall.non_blank == 0 {
        return IngestError::EmptyFile {
            path: path.to_path_buf(),
        };
    }
    IngestError::SkipExceedsRows {
        path: path.to_path_buf(),
        requested: options.leading_skip() + options.header_rows + options.trailing_skip(),
        available: shortfall.records,
    }
}

/// Derives one name per position. Several header rows are joined with `_`;
/// blank names become `column_<index>`.
fn column_names(headers: &[Vec<String>]) -> Vec<String> {
    let width = headers.iter().map(Vec::len).max().unwrap_or(0);
    (0..width)
        .map(|idx| {
            let name = match headers {
                [single] => single.get(idx).cloned().unwrap_or_default(),
                _ => headers
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| cell.trim())
                    .filter(|cell| !cell.is_empty())
                    .collect::<Vec<_>>()
                    .join("_"),
            };
            if name.trim().is_empty() {
                format!("column_{idx}")
            } else {
                name
            }
        })
        .collect()
}

impl Source for DsvSource {
    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn name_hint(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn records(&self) -> Result<RecordStream<'_>> {
        let rows = self.rows()?;
        Ok(Box::new(rows.map(|row| {
            row.map(|values| values.into_iter().map(Some).collect())
        })))
    }

    fn row_count_hint(&self) -> Option<usize> {
        Some(self.data_rows)
    }
}

impl PartialEq for DsvSource {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

impl fmt::Debug for DsvSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DsvSource")
            .field("path", &self.path)
            .field("delimiter", &self.options.delimiter)
            .field("encoding", &self.encoding.name())
            .field("columns", &self.columns)
            .finish()
    }
}

impl<'a> IntoIterator for &'a DsvSource {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

/// Streaming iterator over the data rows of a [`DsvSource`].
///
/// Footer rows are withheld with a lookahead buffer the size of the footer,
/// so the file is still read only once per pass.
pub struct DsvRows {
    reader: RecordReader,
    path: PathBuf,
    width: usize,
    skip_empty: bool,
    truncate: bool,
    footer: usize,
    /// Raw records with the line they ended on, held back for the footer.
    pending: VecDeque<(usize, Vec<String>)>,
    done: bool,
}

impl DsvRows {
    fn fit(&self, line: usize, mut row: Vec<String>) -> Result<Vec<String>> {
        if row.len() > self.width {
            if !self.truncate {
                return Err(IngestError::RowTooWide {
                    path: self.path.clone(),
                    line,
                    expected: self.width,
                    found: row.len(),
                });
            }
            tracing::warn!(
                path = %self.path.display(),
                line,
                expected = self.width,
                found = row.len(),
                "row has more fields than columns; extra fields dropped"
            );
            row.truncate(self.width);
        } else if row.len() < self.width {
            tracing::debug!(
                path = %self.path.display(),
                line,
                expected = self.width,
                found = row.len(),
                "short row padded with empty values"
            );
            row.resize(self.width, String::new());
        }
        Ok(row)
    }
}

impl Iterator for DsvRows {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.reader.next_record() {
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
                Ok(None) => self.done = true,
                Ok(Some(record)) => {
                    if self.skip_empty && is_blank(&record) {
                        continue;
                    }
                    self.pending.push_back((self.reader.line_number(), record));
                    if self.pending.len() > self.footer {
                        let (line, record) = self.pending.pop_front()?;
                        let fitted = self.fit(line, record);
                        if fitted.is_err() {
                            self.done = true;
                        }
                        return Some(fitted);
                    }
                }
            }
        }
        None
    }
}
