//! SQL generation for the inferred table.
//!
//! Numeric and boolean casts use SQLite expressions. Temporal casts call
//! scalar functions registered on the connection by [`register_functions`],
//! which reuse the classifier's format tables.

use rusqlite::Connection;
use rusqlite::functions::FunctionFlags;
use tabprof_ingest::sql::quote_ident;
use tabprof_model::DataType;

use crate::formats::{canonical_date, canonical_datetime, canonical_time};

pub const DATE_FUNCTION: &str = "tabprof_date";
pub const TIME_FUNCTION: &str = "tabprof_time";
pub const DATETIME_FUNCTION: &str = "tabprof_datetime";

/// Suffix of the typed companion of each column.
pub const CAST_SUFFIX: &str = "_cast";

/// Tokens the boolean cast maps to 1 and 0, compared case-insensitively.
pub const TRUTHY_TOKENS: &[&str] = &["true", "1", "yes", "y", "t"];
pub const FALSY_TOKENS: &[&str] = &["false", "0", "no", "n", "f"];

/// Declared column type of a cast column.
pub fn sql_type(data_type: DataType) -> &'static str {
    match data_type {
        DataType::Text => "TEXT",
        DataType::Integer => "INTEGER",
        DataType::Float => "REAL",
        DataType::Boolean => "BOOLEAN",
        DataType::Date => "DATE",
        DataType::Time => "TIME",
        DataType::DateTime => "DATETIME",
    }
}

/// Expression converting the text column `column` to `data_type`.
/// Blank and unparseable values become NULL.
pub fn cast_expression(column: &str, data_type: DataType) -> String {
    let col = quote_ident(column);
    match data_type {
        DataType::Text => col,
        DataType::Integer => numeric_cast(&col, "INTEGER"),
        DataType::Float => numeric_cast(&col, "REAL"),
        DataType::Boolean => format!(
            "CASE WHEN LOWER(TRIM({col})) IN ({}) THEN 1 WHEN LOWER(TRIM({col})) IN ({}) THEN 0 ELSE NULL END",
            token_list(TRUTHY_TOKENS),
            token_list(FALSY_TOKENS),
        ),
        DataType::Date => format!("{DATE_FUNCTION}({col})"),
        DataType::Time => format!("{TIME_FUNCTION}({col})"),
        DataType::DateTime => format!("{DATETIME_FUNCTION}({col})"),
    }
}

fn numeric_cast(col: &str, target: &str) -> String {
    format!("CASE WHEN TRIM({col}) = '' THEN NULL ELSE CAST(TRIM({col}) AS {target}) END")
}

fn token_list(tokens: &[&str]) -> String {
    tokens
        .iter()
        .map(|token| format!("'{token}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Registers the temporal cast functions on `conn`.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;
    conn.create_scalar_function(DATE_FUNCTION, 1, flags, |ctx| {
        let value: Option<String> = ctx.get(0)?;
        Ok(value.and_then(|v| canonical_date(&v)))
    })?;
    conn.create_scalar_function(TIME_FUNCTION, 1, flags, |ctx| {
        let value: Option<String> = ctx.get(0)?;
        Ok(value.and_then(|v| canonical_time(&v)))
    })?;
    conn.create_scalar_function(DATETIME_FUNCTION, 1, flags, |ctx| {
        let value: Option<String> = ctx.get(0)?;
        Ok(value.and_then(|v| canonical_datetime(&v)))
    })?;
    Ok(())
}
