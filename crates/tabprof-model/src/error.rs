use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure categories shared by every tabprof error type.
///
/// Library errors expose `kind()` so pipelines can branch on the category
/// without matching individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Invalid construction parameters (missing file, empty delimiter,
    /// unsupported encoding, unknown table, ...).
    Configuration,
    /// The backing store could not be opened or queried.
    Connectivity,
    /// Row counts disagree between stages; the affected table is unusable.
    Integrity,
    /// Reading or writing local files failed after construction.
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Connectivity => "connectivity",
            ErrorKind::Integrity => "integrity",
            ErrorKind::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
