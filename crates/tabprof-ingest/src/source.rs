//! The source abstraction shared by delimited files and database tables.

use std::slice;

use tabprof_model::Column;

use crate::error::Result;

/// One row of raw values, positionally aligned with the source's columns.
/// `None` is a SQL NULL; delimited files never produce it.
pub type Record = Vec<Option<String>>;

/// Lazy, finite stream of records. Each call to [`Source::records`] starts a
/// fresh pass from the first data row.
pub type RecordStream<'a> = Box<dyn Iterator<Item = Result<Record>> + 'a>;

/// Ordered, fixed-size column list plus a way to stream the raw rows.
///
/// Column names are not guaranteed unique; consumers that need to tell
/// duplicates apart key by position.
pub trait Source {
    /// Columns in source order.
    fn columns(&self) -> &[Column];

    /// Deterministic seed for naming a staging table built from this source.
    fn name_hint(&self) -> String;

    /// Start a new pass over the data rows.
    fn records(&self) -> Result<RecordStream<'_>>;

    /// Number of data rows, when the source already knows it without a scan.
    fn row_count_hint(&self) -> Option<usize> {
        None
    }

    fn len(&self) -> usize {
        self.columns().len()
    }

    fn is_empty(&self) -> bool {
        self.columns().is_empty()
    }

    /// Column at `index`; negative indexes count back from the end.
    fn column(&self, index: isize) -> Option<&Column> {
        let len = isize::try_from(self.len()).ok()?;
        let resolved = if index < 0 { index + len } else { index };
        usize::try_from(resolved)
            .ok()
            .and_then(|idx| self.columns().get(idx))
    }

    fn iter(&self) -> slice::Iter<'_, Column> {
        self.columns().iter()
    }
}

impl PartialEq for dyn Source + '_ {
    fn eq(&self, other: &Self) -> bool {
        self.columns() == other.columns()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<Column>);

    impl Source for Fixed {
        fn columns(&self) -> &[Column] {
            &self.0
        }

        fn name_hint(&self) -> String {
            "fixed".to_string()
        }

        fn records(&self) -> Result<RecordStream<'_>> {
            Ok(Box::new(std::iter::empty()))
        }
    }

    fn fixed(names: &[&str]) -> Fixed {
        Fixed(names.iter().copied().map(Column::new).collect())
    }

    #[test]
    fn test_negative_indexing() {
        let source = fixed(&["col1", "col2"]);
        assert_eq!(source.column(-1).map(Column::name), Some("col2"));
        assert_eq!(source.column(-2).map(Column::name), Some("col1"));
        assert!(source.column(-3).is_none());
        assert!(source.column(2).is_none());
    }

    #[test]
    fn test_empty_source() {
        let source = fixed(&[]);
        assert!(source.is_empty());
        assert_eq!(source.iter().count(), 0);
        assert!(source.column(0).is_none());
        assert!(source.column(-1).is_none());
    }

    #[test]
    fn test_duplicate_names_are_kept() {
        let source = fixed(&["col1", "col1"]);
        assert_eq!(source.len(), 2);
        assert_eq!(source.column(0), source.column(1));
    }

    #[test]
    fn test_equality_compares_columns() {
        let a = fixed(&["a", "b"]);
        let b = fixed(&["a", "b"]);
        let c = fixed(&["a", "c"]);
        let (a, b, c): (&dyn Source, &dyn Source, &dyn Source) = (&a, &b, &c);
        assert!(a == b);
        assert!(a != c);
    }
}
