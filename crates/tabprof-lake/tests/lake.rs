use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tabprof_ingest::{DbSource, DsvOptions, DsvSource, Source};
use tabprof_ingest::sql::ROW_KEY;
use tabprof_lake::{COLUMN_MAP_TABLE, DataLake, DataLakeBuilder, LakeError, LakeOptions};
use tabprof_model::{DataType, ErrorKind};
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write file");
    path
}

fn table_rows(lake: &DataLake) -> Vec<Vec<Option<String>>> {
    lake.raw_source()
        .records()
        .expect("records")
        .collect::<Result<Vec<_>, _>>()
        .expect("read rows")
}

fn declared_columns(db: &Path, table: &str) -> Vec<(String, String)> {
    let conn = Connection::open(db).expect("open db");
    let mut stmt = conn
        .prepare("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")
        .expect("prepare");
    stmt.query_map([table], |row| Ok((row.get(0)?, row.get(1)?)))
        .expect("query")
        .collect::<Result<Vec<_>, _>>()
        .expect("columns")
}

#[test]
fn loads_delimited_file_as_text() {
    let input = TempDir::new().expect("input dir");
    let lake_dir = TempDir::new().expect("lake dir");
    let path = write_file(
        input.path(),
        "scenario.csv",
        "id,name,value\n1,Alice,10.5\n2,Bob,20.0\n3,Charlie,15.75\n",
    );
    let source = DsvSource::new(&path).expect("open source");
    let lake = DataLakeBuilder::new(lake_dir.path())
        .build(&source)
        .expect("build lake");

    assert_eq!(lake.table_name(), "scenario");
    assert_eq!(lake.inferred_table_name(), "scenario_inferred");
    assert_eq!(lake.db_path(), lake_dir.path().join("scenario.sqlite"));
    assert_eq!(lake.row_count().expect("count"), 3);
    assert_eq!(lake.column_names(), vec!["id", "name", "value"]);
    assert!(lake.columns().iter().all(|c| c.raw_type() == DataType::Text));
    assert!(lake.columns().iter().all(|c| c.inferred_type() == DataType::Text));
    let declared = declared_columns(lake.db_path(), "scenario");
    assert_eq!(declared[0], (ROW_KEY.to_string(), "INTEGER".to_string()));
    assert!(declared[1..].iter().all(|(_, ty)| ty == "TEXT"));
    assert_eq!(declared.len(), 4);
    assert_eq!(
        table_rows(&lake)[1],
        vec![
            Some("2".to_string()),
            Some("Bob".to_string()),
            Some("20.0".to_string())
        ]
    );
}

#[test]
fn values_are_stored_verbatim() {
    let input = TempDir::new().expect("input dir");
    let lake_dir = TempDir::new().expect("lake dir");
    let path = write_file(input.path(), "codes.csv", "code,amount\n007,1e3\n,0.50\n");
    let source = DsvSource::new(&path).expect("open source");
    let lake = DataLakeBuilder::new(lake_dir.path()).build(&source).expect("build");
    assert_eq!(
        table_rows(&lake),
        vec![
            vec![Some("007".to_string()), Some("1e3".to_string())],
            vec![Some(String::new()), Some("0.50".to_string())],
        ]
    );
}

#[test]
fn batch_size_does_not_change_contents() {
    let input = TempDir::new().expect("input dir");
    let mut contents = String::from("n,square\n");
    for i in 0..25 {
        contents.push_str(&format!("{i},{}\n", i * i));
    }
    let path = write_file(input.path(), "squares.csv", &contents);
    let source = DsvSource::new(&path).expect("open source");

    let mut seen = Vec::new();
    for batch_size in [1, 7, 25, 1000] {
        let lake_dir = TempDir::new().expect("lake dir");
        let lake = DataLakeBuilder::new(lake_dir.path())
            .with_batch_size(batch_size)
            .build(&source)
            .expect("build");
        assert_eq!(lake.row_count().expect("count"), 25);
        seen.push(table_rows(&lake));
    }
    assert!(seen.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn rebuild_overwrites_table_and_stale_inferred() {
    let input = TempDir::new().expect("input dir");
    let lake_dir = TempDir::new().expect("lake dir");
    let path = write_file(input.path(), "orders.csv", "a,b\n1,2\n3,4\n5,6\n");
    let source = DsvSource::new(&path).expect("open source");
    let lake = DataLakeBuilder::new(lake_dir.path()).build(&source).expect("build");

    let conn = Connection::open(lake.db_path()).expect("open db");
    conn.execute_batch("CREATE TABLE orders_inferred (x TEXT)")
        .expect("stale table");
    drop(conn);

    fs::write(&path, "a,b,c\n7,8,9\n").expect("rewrite");
    let source = DsvSource::new(&path).expect("reopen source");
    let lake = DataLakeBuilder::new(lake_dir.path()).build(&source).expect("rebuild");
    assert_eq!(lake.row_count().expect("count"), 1);
    assert_eq!(lake.column_names(), vec!["a", "b", "c"]);

    let conn = Connection::open(lake.db_path()).expect("open db");
    let stale: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE name = 'orders_inferred'",
            [],
            |row| row.get(0),
        )
        .expect("query");
    assert_eq!(stale, 0);
}

#[test]
fn duplicate_and_odd_names_are_disambiguated() {
    let input = TempDir::new().expect("input dir");
    let lake_dir = TempDir::new().expect("lake dir");
    let path = write_file(
        input.path(),
        "my data-2024.txt",
        "id|ID|col1,col2|\"quoted\"\"name\"\n1|2|3|4\n",
    );
    let source =
        DsvSource::open(&path, DsvOptions::default().with_delimiter("|")).expect("open source");
    let lake = DataLakeBuilder::new(lake_dir.path()).build(&source).expect("build");

    assert_eq!(lake.table_name(), "my_data_2024");
    assert_eq!(
        lake.column_names(),
        vec!["id", "ID_1", "col1,col2", "quoted\"name"]
    );
    assert_eq!(
        lake.source_names(),
        ["id", "ID", "col1,col2", "quoted\"name"]
    );
    assert_eq!(lake.row_count().expect("count"), 1);

    let reopened = DataLake::open(lake_dir.path(), "my_data_2024").expect("reopen");
    assert_eq!(reopened.source_names(), lake.source_names());

    let conn = Connection::open(lake.db_path()).expect("open db");
    let mapped: Vec<(String, String)> = conn
        .prepare(&format!(
            "SELECT source_name, column_name FROM {COLUMN_MAP_TABLE} ORDER BY position"
        ))
        .expect("prepare")
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .expect("query")
        .collect::<Result<_, _>>()
        .expect("map rows");
    assert_eq!(mapped[1], ("ID".to_string(), "ID_1".to_string()));
}

#[test]
fn rowid_headers_keep_rows_addressable() {
    let input = TempDir::new().expect("input dir");
    let lake_dir = TempDir::new().expect("lake dir");
    let mut contents = String::from("rowid,oid,_rowid_,value\n");
    for i in 0..50 {
        contents.push_str(&format!("r{i},o{i},x{i},{i}\n"));
    }
    let path = write_file(input.path(), "shadow.csv", &contents);
    let source = DsvSource::new(&path).expect("open source");
    let lake = DataLakeBuilder::new(lake_dir.path())
        .with_batch_size(7)
        .build(&source)
        .expect("build");

    assert_eq!(lake.column_names(), vec!["rowid", "oid", "_rowid_", "value"]);
    assert_eq!(lake.raw_source().row_key(), Some(ROW_KEY));
    let rows = table_rows(&lake);
    assert_eq!(rows.len(), 50);
    assert_eq!(rows[0][0].as_deref(), Some("r0"));
    assert_eq!(rows[49][3].as_deref(), Some("49"));
}

#[test]
fn header_named_like_row_key_is_renamed() {
    let input = TempDir::new().expect("input dir");
    let lake_dir = TempDir::new().expect("lake dir");
    let path = write_file(input.path(), "keyed.csv", &format!("{ROW_KEY},v\na,1\n"));
    let source = DsvSource::new(&path).expect("open source");
    let lake = DataLakeBuilder::new(lake_dir.path()).build(&source).expect("build");

    assert_eq!(lake.column_names(), vec![format!("{ROW_KEY}_0").as_str(), "v"]);
    assert_eq!(lake.source_names(), [ROW_KEY, "v"]);
    assert_eq!(
        table_rows(&lake),
        vec![vec![Some("a".to_string()), Some("1".to_string())]]
    );
}

#[test]
fn table_name_override() {
    let input = TempDir::new().expect("input dir");
    let lake_dir = TempDir::new().expect("lake dir");
    let path = write_file(input.path(), "x.csv", "a\n1\n");
    let source = DsvSource::new(&path).expect("open source");
    let lake = DataLakeBuilder::new(lake_dir.path())
        .with_options(LakeOptions::default().with_table_name("people"))
        .build(&source)
        .expect("build");
    assert_eq!(lake.table_name(), "people");
    assert!(lake_dir.path().join("people.sqlite").exists());
}

#[test]
fn header_only_file_builds_empty_table() {
    let input = TempDir::new().expect("input dir");
    let lake_dir = TempDir::new().expect("lake dir");
    let path = write_file(input.path(), "empty_rows.csv", "a,b\n");
    let source = DsvSource::new(&path).expect("open source");
    let lake = DataLakeBuilder::new(lake_dir.path()).build(&source).expect("build");
    assert_eq!(lake.row_count().expect("count"), 0);
    assert_eq!(lake.columns().len(), 2);
}

#[test]
fn loads_from_database_table() {
    let input = TempDir::new().expect("input dir");
    let lake_dir = TempDir::new().expect("lake dir");
    let db = input.path().join("src.sqlite");
    let conn = Connection::open(&db).expect("create db");
    conn.execute_batch(
        "CREATE TABLE people (id INTEGER, born DATE);
         INSERT INTO people VALUES (1, '1990-04-01'), (2, NULL);",
    )
    .expect("seed");
    drop(conn);

    let source = DbSource::from_path(&db, None, "people").expect("open source");
    assert_eq!(source.column(0).expect("id").raw_type(), DataType::Integer);

    let lake = DataLakeBuilder::new(lake_dir.path()).build(&source).expect("build");
    assert_eq!(lake.table_name(), "people");
    assert!(lake.columns().iter().all(|c| c.raw_type() == DataType::Text));
    assert_eq!(
        table_rows(&lake),
        vec![
            vec![Some("1".to_string()), Some("1990-04-01".to_string())],
            vec![Some("2".to_string()), None],
        ]
    );
}

#[test]
fn database_rows_with_non_positive_keys_are_all_loaded() {
    let input = TempDir::new().expect("input dir");
    let lake_dir = TempDir::new().expect("lake dir");
    let db = input.path().join("src.sqlite");
    let conn = Connection::open(&db).expect("create db");
    conn.execute_batch(
        "CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT);
         INSERT INTO people VALUES (-1, 'neg'), (0, 'zero'), (1, 'one'), (2, 'two');",
    )
    .expect("seed");
    drop(conn);

    let source = DbSource::from_path(&db, None, "people")
        .expect("open source")
        .with_page_size(3);
    let lake = DataLakeBuilder::new(lake_dir.path()).build(&source).expect("build");

    assert_eq!(lake.row_count().expect("count"), 4);
    let ids: Vec<Option<String>> = table_rows(&lake).into_iter().map(|r| r[0].clone()).collect();
    assert_eq!(
        ids,
        vec![
            Some("-1".to_string()),
            Some("0".to_string()),
            Some("1".to_string()),
            Some("2".to_string()),
        ]
    );
}

#[test]
fn reopen_existing_lake() {
    let input = TempDir::new().expect("input dir");
    let lake_dir = TempDir::new().expect("lake dir");
    let path = write_file(input.path(), "again.csv", "a\n1\n2\n");
    let source = DsvSource::new(&path).expect("open source");
    let built = DataLakeBuilder::new(lake_dir.path()).build(&source).expect("build");

    let reopened = DataLake::open(lake_dir.path(), "again").expect("reopen");
    assert_eq!(reopened.columns(), built.columns());
    assert_eq!(reopened.row_count().expect("count"), 2);

    let err = DataLake::open(lake_dir.path(), "missing").expect_err("missing lake");
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(matches!(err, LakeError::Source(_)));
}
