//! Connection integration tests.
//!
//! Tests connection lifetimes in both usage modes.

use super::memory_params;
use sql_runner::config::ConnectionParams;
use sql_runner::runner::{connect_execute, discard, Connector};
use std::cell::Cell;

#[test]
fn test_open_and_close_memory_database() {
    let connector = Connector::open(&memory_params()).unwrap();
    connector.close().unwrap();
}

#[test]
fn test_unknown_scheme_is_connection_error() {
    let params = ConnectionParams::new("nosuchdb://localhost:1234/db", "root", "1234");

    let err = Connector::open(&params).unwrap_err();

    assert!(err.is_connection(), "expected connection error, got: {err}");
}

#[test]
fn test_malformed_address_is_connection_error() {
    let params = ConnectionParams::new("not a connection string", "root", "1234");

    let called = Cell::new(false);
    let err = connect_execute(&params, "SELECT 1", |_| {
        called.set(true);
        Ok(())
    })
    .unwrap_err();

    assert!(err.is_connection());
    assert!(!called.get());
}

#[test]
fn test_one_shot_select() {
    let mut names = Vec::new();
    connect_execute(&memory_params(), "SELECT 1 AS one, 'two' AS two", |result| {
        let result_set = result.expect("select yields rows");
        names = result_set.column_names().to_vec();
        assert!(result_set.next_row()?.is_some());
        assert!(result_set.next_row()?.is_none());
        Ok(())
    })
    .unwrap();

    assert_eq!(names, vec!["one", "two"]);
}

#[test]
fn test_one_shot_calls_use_separate_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("music.db");
    let params = ConnectionParams::new(format!("sqlite://{}?mode=rwc", path.display()), "", "");

    connect_execute(&params, "CREATE TABLE songs (title TEXT)", discard).unwrap();
    connect_execute(&params, "INSERT INTO songs VALUES ('Bohemian Rhapsody')", discard).unwrap();

    let mut count = 0;
    connect_execute(&params, "SELECT title FROM songs", |result| {
        let result_set = result.expect("select yields rows");
        while result_set.next_row()?.is_some() {
            count += 1;
        }
        Ok(())
    })
    .unwrap();

    assert_eq!(count, 1);
}

#[test]
fn test_memory_database_lives_as_long_as_connector() {
    let mut connector = Connector::open(&memory_params()).unwrap();
    connector.execute_discarding("CREATE TABLE t (a INTEGER)").unwrap();
    connector.execute_discarding("INSERT INTO t VALUES (1)").unwrap();

    // Same connection, so the in-memory table is still there.
    let output = connector.fetch("SELECT a FROM t").unwrap();
    assert_eq!(output.rows().unwrap().row_count(), 1);

    connector.close().unwrap();
}
