//! Configuration for reading delimited text files.

use serde::{Deserialize, Serialize};

/// Options for reading a delimited file.
///
/// Every field has a documented default, so a partial configuration file only
/// needs to name what differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DsvOptions {
    /// Field separator; may be several characters long.
    /// Defaults to `","`.
    pub delimiter: String,

    /// Quote character wrapping fields that contain the delimiter.
    /// Defaults to `Some('"')`.
    pub bookend: Option<char>,

    /// Trim surrounding whitespace from unbookended fields.
    /// Defaults to true.
    pub strip: bool,

    /// Trim whitespace inside bookended fields.
    /// Defaults to true.
    pub bookend_strip: bool,

    /// Encoding label understood by `encoding_rs` (`utf-8`, `latin1`, ...).
    /// Defaults to `"utf-8"`.
    pub encoding: String,

    /// Rows to discard before the header. Negative values act as zero.
    /// Defaults to 0.
    pub skip_header_rows: i64,

    /// Data rows to discard from the end of the file. Negative values act as zero.
    /// Defaults to 0.
    pub skip_footer_rows: i64,

    /// Rows that together name the columns. Must be at least 1.
    /// Defaults to 1.
    pub header_rows: usize,

    /// Drop rows whose fields are all blank.
    /// Defaults to true.
    pub skip_empty_rows: bool,

    /// Drop fields beyond the column count instead of failing the read.
    /// Defaults to false.
    pub truncate_long_rows: bool,
}

impl Default for DsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            bookend: Some('"'),
            strip: true,
            bookend_strip: true,
            encoding: "utf-8".to_string(),
            skip_header_rows: 0,
            skip_footer_rows: 0,
            header_rows: 1,
            skip_empty_rows: true,
            truncate_long_rows: false,
        }
    }
}

impl DsvOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    #[must_use]
    pub fn with_bookend(mut self, bookend: Option<char>) -> Self {
        self.bookend = bookend;
        self
    }

    #[must_use]
    pub fn with_strip(mut self, strip: bool) -> Self {
        self.strip = strip;
        self
    }

    #[must_use]
    pub fn with_bookend_strip(mut self, bookend_strip: bool) -> Self {
        self.bookend_strip = bookend_strip;
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    #[must_use]
    pub fn with_skip_header_rows(mut self, rows: i64) -> Self {
        self.skip_header_rows = rows;
        self
    }

    #[must_use]
    pub fn with_skip_footer_rows(mut self, rows: i64) -> Self {
        self.skip_footer_rows = rows;
        self
    }

    #[must_use]
    pub fn with_header_rows(mut self, rows: usize) -> Self {
        self.header_rows = rows;
        self
    }

    #[must_use]
    pub fn with_skip_empty_rows(mut self, skip: bool) -> Self {
        self.skip_empty_rows = skip;
        self
    }

    #[must_use]
    pub fn with_truncate_long_rows(mut self, truncate: bool) -> Self {
        self.truncate_long_rows = truncate;
        self
    }

    /// Rows discarded before the header, with negatives clamped to zero.
    pub fn leading_skip(&self) -> usize {
        usize::try_from(self.skip_header_rows).unwrap_or(0)
    }

    /// Data rows discarded at the end, with negatives clamped to zero.
    pub fn trailing_skip(&self) -> usize {
        usize::try_from(self.skip_footer_rows).unwrap_or(0)
    }
}
