//! Staging load configuration.

use serde::{Deserialize, Serialize};

/// Rows written per transaction when none is configured.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Options for [`DataLakeBuilder`](crate::DataLakeBuilder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LakeOptions {
    /// Rows per write transaction. Memory use is bounded by one batch.
    pub batch_size: usize,

    /// Staging table name. Derived from the source's name hint when unset.
    pub table_name: Option<String>,
}

impl Default for LakeOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            table_name: None,
        }
    }
}

impl LakeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = LakeOptions::default();
        assert_eq!(options.batch_size, 1000);
        assert!(options.table_name.is_none());
    }

    #[test]
    fn test_partial_config() {
        let options: LakeOptions = serde_json::from_str(r#"{"table_name":"orders"}"#).unwrap();
        assert_eq!(options.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(options.table_name.as_deref(), Some("orders"));
    }
}
