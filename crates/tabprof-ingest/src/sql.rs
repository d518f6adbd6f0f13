//! SQL identifier helpers shared by the staging and profiling stages.
//!
//! Column names come from file headers verbatim, so every identifier that
//! reaches generated SQL goes through [`quote_ident`].

use std::collections::HashSet;

/// Hidden `INTEGER PRIMARY KEY` of staging tables. It aliases the rowid, so
/// rows stay addressable when a data column is named `rowid`, `oid` or
/// `_rowid_`. [`DbSource`](crate::DbSource) pages by it and leaves it out of
/// the column list.
pub const ROW_KEY: &str = "__tabprof_row";

/// Names SQLite resolves to the implicit rowid unless a column claims them.
pub const ROWID_ALIASES: &[&str] = &["rowid", "_rowid_", "oid"];

/// Quotes an identifier for SQLite, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `"schema"."table"`.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

/// Reduces an arbitrary name to `[A-Za-z0-9_]`, never empty and never
/// starting with a digit.
pub fn sanitize_identifier(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_underscore = false;
    for ch in raw.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_underscore = false;
        } else if !last_underscore {
            out.push('_');
            last_underscore = true;
        }
    }
    let trimmed = out.trim_matches('_');
    let mut name = if trimmed.is_empty() {
        "table".to_string()
    } else {
        trimmed.to_string()
    };
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// Makes names unique (case-insensitively, as SQLite compares them) while
/// preserving order. A repeated or blank name becomes `<name>_<index>`.
pub fn unique_names<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    unique_names_avoiding(names, &[])
}

/// [`unique_names`] that also treats every name in `reserved` as taken.
pub fn unique_names_avoiding<'a, I>(names: I, reserved: &[&str]) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let names: Vec<&str> = names.into_iter().collect();
    let mut taken: HashSet<String> = reserved.iter().map(|name| name.to_lowercase()).collect();
    let mut out = Vec::with_capacity(names.len());
    for (idx, name) in names.iter().enumerate() {
        let base = if name.is_empty() {
            format!("column_{idx}")
        } else {
            (*name).to_string()
        };
        let mut candidate = base.clone();
        let mut attempt = idx;
        while !taken.insert(candidate.to_lowercase()) {
            candidate = format!("{base}_{attempt}");
            attempt += 1;
        }
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("plain"), "\"plain\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
        assert_eq!(quote_ident("col1,col2"), "\"col1,col2\"");
    }

    #[test]
    fn test_qualified_table() {
        assert_eq!(qualified_table("main", "orders"), "\"main\".\"orders\"");
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("orders"), "orders");
        assert_eq!(sanitize_identifier("my data-file.v2"), "my_data_file_v2");
        assert_eq!(sanitize_identifier("2024 sales"), "_2024_sales");
        assert_eq!(sanitize_identifier("  ...  "), "table");
    }

    #[test]
    fn test_unique_names_by_position() {
        let names = unique_names(["id", "ID", "name", "id", ""]);
        assert_eq!(names, vec!["id", "ID_1", "name", "id_3", "column_4"]);
    }

    #[test]
    fn test_unique_names_skips_taken_suffix() {
        let names = unique_names(["a_1", "a", "a"]);
        assert_eq!(names, vec!["a_1", "a", "a_2"]);
    }

    #[test]
    fn test_reserved_names_are_avoided() {
        let names = unique_names_avoiding(["__TABPROF_ROW", "a"], &[ROW_KEY]);
        assert_eq!(names, vec!["__TABPROF_ROW_0", "a"]);
    }
}
