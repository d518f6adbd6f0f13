//! Serializable profiling summary.

use serde::{Deserialize, Serialize};
use tabprof_model::{Column, DataType};

/// Outcome of the last profiling pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileReport {
    /// Staging table that was profiled.
    pub table: String,
    /// Rows in the staging table at profiling time.
    pub row_count: usize,
    /// Rows actually sampled.
    pub sample_size: usize,
    pub columns: Vec<ColumnProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    /// Header as it appeared in the source, before renaming.
    pub source_name: String,
    pub raw_type: DataType,
    pub inferred_type: DataType,
    pub is_nullable: bool,
}

impl From<&Column> for ColumnProfile {
    fn from(column: &Column) -> Self {
        Self {
            name: column.name().to_string(),
            source_name: column.name().to_string(),
            raw_type: column.raw_type(),
            inferred_type: column.inferred_type(),
            is_nullable: column.is_nullable(),
        }
    }
}

impl ColumnProfile {
    #[must_use]
    pub fn with_source_name(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = source_name.into();
        self
    }
}

impl ProfileReport {
    /// Columns that resolved to something narrower than `TEXT`.
    pub fn typed_columns(&self) -> impl Iterator<Item = &ColumnProfile> {
        self.columns
            .iter()
            .filter(|column| column.inferred_type.is_specific())
    }

    /// Share of rows that were sampled, in `[0, 1]`.
    pub fn coverage(&self) -> f64 {
        if self.row_count == 0 {
            return 1.0;
        }
        self.sample_size as f64 / self.row_count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_upper_case_types() {
        let report = ProfileReport {
            table: "scenario".to_string(),
            row_count: 3,
            sample_size: 3,
            columns: vec![ColumnProfile::from(
                &Column::new("id").with_inferred_type(DataType::Integer),
            )],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["columns"][0]["inferred_type"], "INTEGER");
        assert_eq!(json["columns"][0]["raw_type"], "TEXT");
        assert_eq!(json["columns"][0]["source_name"], "id");
        assert_eq!(report.typed_columns().count(), 1);
        assert!((report.coverage() - 1.0).abs() < f64::EPSILON);
    }
}
