//! Line-oriented record reading with encoding and multi-line bookends.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;

use crate::error::{IngestError, Result};

use super::options::DsvOptions;
use super::tokenizer::{Tokenized, tokenize};

/// Resolves an encoding label, rejecting encodings whose line breaks are not
/// single `\n` bytes.
pub(crate) fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    let encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
        IngestError::UnsupportedEncoding {
            encoding: label.to_string(),
        }
    })?;
    if encoding == encoding_rs::UTF_16LE
        || encoding == encoding_rs::UTF_16BE
        || encoding == encoding_rs::REPLACEMENT
    {
        return Err(IngestError::UnsupportedEncoding {
            encoding: encoding.name().to_string(),
        });
    }
    Ok(encoding)
}

pub(crate) fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

/// Streams tokenized records from a file, one logical record at a time.
///
/// A record normally spans one line; it continues onto following lines while
/// a bookend is open.
pub(crate) struct RecordReader {
    path: PathBuf,
    reader: BufReader<File>,
    encoding: &'static Encoding,
    options: DsvOptions,
    buffer: Vec<u8>,
    line_number: usize,
}

impl RecordReader {
    pub(crate) fn open(path: &Path, options: &DsvOptions, encoding: &'static Encoding) -> Result<Self> {
        let file = open_file(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            encoding,
            options: options.clone(),
            buffer: Vec::new(),
            line_number: 0,
        })
    }

    /// Physical line number of the last line read (1-based).
    pub(crate) fn line_number(&self) -> usize {
        self.line_number
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        self.buffer.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buffer)
            .map_err(|e| IngestError::FileRead {
                path: self.path.clone(),
                source: e,
            })?;
        if read == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        let mut bytes = self.buffer.as_slice();
        if let Some(stripped) = bytes.strip_suffix(b"\n") {
            bytes = stripped;
        }
        if let Some(stripped) = bytes.strip_suffix(b"\r") {
            bytes = stripped;
        }

        let (text, had_errors) = self.encoding.decode_without_bom_handling(bytes);
        if had_errors {
            return Err(IngestError::Decode {
                path: self.path.clone(),
                line: self.line_number,
                encoding: self.encoding.name(),
            });
        }
        let text: &str = &text;
        let text = if self.line_number == 1 {
            text.strip_prefix('\u{feff}').unwrap_or(text)
        } else {
            text
        };
        Ok(Some(text.to_string()))
    }

    /// Next logical record, or `None` at end of file.
    pub(crate) fn next_record(&mut self) -> Result<Option<Vec<String>>> {
        let Some(mut text) = self.read_line()? else {
            return Ok(None);
        };
        loop {
            match tokenize(&text, &self.options) {
                Tokenized::Complete(fields) => return Ok(Some(fields)),
                Tokenized::Unterminated(fields) => match self.read_line()? {
                    Some(next) => {
                        text.push('\n');
                        text.push_str(&next);
                    }
                    None => {
                        tracing::warn!(
                            path = %self.path.display(),
                            line = self.line_number,
                            "bookend still open at end of file"
                        );
                        return Ok(Some(fields));
                    }
                },
            }
        }
    }
}
