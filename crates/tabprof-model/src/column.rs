use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DataType;

/// Metadata for one column of a source or table.
///
/// `raw_type` records how values are stored and is fixed at construction;
/// `inferred_type` is what profiling concluded and starts out as `Text`.
/// Equality compares all four fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    name: String,
    inferred_type: DataType,
    raw_type: DataType,
    is_nullable: bool,
}

impl Column {
    /// A nullable column stored and inferred as `Text`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inferred_type: DataType::Text,
            raw_type: DataType::Text,
            is_nullable: true,
        }
    }

    /// A nullable column whose storage representation is `raw_type`.
    pub fn with_raw_type(name: impl Into<String>, raw_type: DataType) -> Self {
        Self {
            raw_type,
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn with_inferred_type(mut self, inferred_type: DataType) -> Self {
        self.inferred_type = inferred_type;
        self
    }

    #[must_use]
    pub fn with_nullable(mut self, is_nullable: bool) -> Self {
        self.is_nullable = is_nullable;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inferred_type(&self) -> DataType {
        self.inferred_type
    }

    pub fn raw_type(&self) -> DataType {
        self.raw_type
    }

    pub fn is_nullable(&self) -> bool {
        self.is_nullable
    }

    pub fn set_inferred_type(&mut self, inferred_type: DataType) {
        self.inferred_type = inferred_type;
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.inferred_type)
    }
}
