//! Integration tests against SQLite.

pub mod connection_test;

use sql_runner::config::ConnectionParams;
use sql_runner::runner::Connector;

/// Parameters for a private in-memory database.
pub fn memory_params() -> ConnectionParams {
    ConnectionParams::new("sqlite::memory:", "", "")
}

/// Opens an in-memory database holding a small `artists` table.
pub fn artists_db() -> Connector {
    let mut connector = Connector::open(&memory_params()).unwrap();
    connector
        .execute_discarding("CREATE TABLE artists (id INTEGER PRIMARY KEY, name TEXT, rating REAL)")
        .unwrap();
    connector
        .execute_discarding("INSERT INTO artists (id, name, rating) VALUES (1, 'Queen', 4.5)")
        .unwrap();
    connector
        .execute_discarding("INSERT INTO artists (id, name, rating) VALUES (2, NULL, 3.0)")
        .unwrap();
    connector
}

/// Opens an in-memory database holding a `songs` table with date, decimal
/// and boolean columns.
pub fn songs_db() -> Connector {
    let mut connector = Connector::open(&memory_params()).unwrap();
    connector
        .execute_discarding(
            "CREATE TABLE songs (id INTEGER, released DATE, price NUMERIC, live BOOLEAN, added DATETIME)",
        )
        .unwrap();
    connector
        .execute_discarding("INSERT INTO songs VALUES (1, '1975-10-31', 9.99, 1, '2024-01-02 03:04:05')")
        .unwrap();
    connector
        .execute_discarding("INSERT INTO songs VALUES (2, NULL, NULL, 0, NULL)")
        .unwrap();
    connector
}
