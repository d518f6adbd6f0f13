use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic type of a column.
///
/// `Text` is the universal fallback: any value that fails the parse rules of
/// every other member is still representable as `Text`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    #[default]
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    Time,
    DateTime,
}

impl DataType {
    /// Every member, in declaration order.
    pub const ALL: [DataType; 7] = [
        DataType::Text,
        DataType::Integer,
        DataType::Float,
        DataType::Boolean,
        DataType::Date,
        DataType::Time,
        DataType::DateTime,
    ];

    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Text => "TEXT",
            DataType::Integer => "INTEGER",
            DataType::Float => "FLOAT",
            DataType::Boolean => "BOOLEAN",
            DataType::Date => "DATE",
            DataType::Time => "TIME",
            DataType::DateTime => "DATETIME",
        }
    }

    /// Returns true for every member except the `Text` fallback.
    pub fn is_specific(&self) -> bool {
        !matches!(self, DataType::Text)
    }

    /// Returns true for `Integer` and `Float`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Float)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    /// Parse a type name, case-insensitively. `DATE_TIME` and `FLOAT`'s
    /// common alias `REAL` are accepted as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TEXT" => Ok(DataType::Text),
            "INTEGER" => Ok(DataType::Integer),
            "FLOAT" | "REAL" => Ok(DataType::Float),
            "BOOLEAN" => Ok(DataType::Boolean),
            "DATE" => Ok(DataType::Date),
            "TIME" => Ok(DataType::Time),
            "DATETIME" | "DATE_TIME" => Ok(DataType::DateTime),
            other => Err(format!("unknown data type: {other}")),
        }
    }
}
