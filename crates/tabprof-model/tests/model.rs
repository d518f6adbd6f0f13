//! Tests for tabprof-model types.

use tabprof_model::{Column, DataType, ErrorKind};

#[test]
fn column_builder_sets_inferred_type_and_nullability() {
    let column = Column::new("custom_column")
        .with_inferred_type(DataType::Integer)
        .with_nullable(false);

    assert_eq!(column.name(), "custom_column");
    assert_eq!(column.inferred_type(), DataType::Integer);
    assert_eq!(column.raw_type(), DataType::Text);
    assert!(!column.is_nullable());
}

#[test]
fn column_display_names_inferred_type() {
    let column = Column::new("test_column").with_inferred_type(DataType::Float);
    assert_eq!(column.to_string(), "test_column (FLOAT)");
}

#[test]
fn columns_compare_all_fields() {
    let a = Column::new("a");
    assert_eq!(a, Column::new("a"));
    assert_ne!(a, Column::new("b"));
    assert_ne!(a, Column::new("a").with_inferred_type(DataType::Date));
    assert_ne!(a, Column::with_raw_type("a", DataType::Integer));
    assert_ne!(a, Column::new("a").with_nullable(false));
}

#[test]
fn setting_inferred_type_leaves_raw_type_alone() {
    let mut column = Column::with_raw_type("ts", DataType::Text);
    column.set_inferred_type(DataType::DateTime);
    assert_eq!(column.inferred_type(), DataType::DateTime);
    assert_eq!(column.raw_type(), DataType::Text);
}

#[test]
fn column_names_are_not_normalized() {
    for name in ["", "col with spaces", "col-with-dashes", "列名", "\"quoted\""] {
        let column = Column::new(name);
        assert_eq!(column.name(), name);
        assert_eq!(column.inferred_type(), DataType::Text);
    }
}

#[test]
fn data_type_membership_is_closed() {
    let names: Vec<&str> = DataType::ALL.iter().map(DataType::as_str).collect();
    assert_eq!(
        names,
        vec!["TEXT", "INTEGER", "FLOAT", "BOOLEAN", "DATE", "TIME", "DATETIME"]
    );
}

#[test]
fn data_type_parses_case_insensitively() {
    assert_eq!("integer".parse::<DataType>(), Ok(DataType::Integer));
    assert_eq!(" DateTime ".parse::<DataType>(), Ok(DataType::DateTime));
    assert_eq!("real".parse::<DataType>(), Ok(DataType::Float));
}

#[test]
fn error_kind_serializes_snake_case() {
    let json = serde_json::to_string(&ErrorKind::Connectivity).expect("serialize kind");
    assert_eq!(json, "\"connectivity\"");
}
