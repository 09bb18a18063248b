//! Database abstraction layer for sql-runner.
//!
//! The runner only talks to these traits. A connection hands out statements,
//! a statement hands out cursors, and each of the three is released through
//! `close`. Implementations must make `close` idempotent: the runner calls it
//! explicitly, and drop-based cleanup may call it again.

mod convert;
#[cfg(test)]
pub(crate) mod mock;
mod native;
mod relation;
mod types;

pub use native::SqlxDriver;
pub use types::{QueryResult, ResultMetadata, Row, Value};

use crate::config::ConnectionParams;
use crate::error::DriverResult;

/// Opens connections.
pub trait Driver {
    /// Establishes a new connection using the given parameters.
    fn connect(&self, params: &ConnectionParams) -> DriverResult<Box<dyn Connection>>;
}

/// An open channel to a database instance.
pub trait Connection {
    /// Acquires a statement handle scoped to one execution.
    fn create_statement(&mut self) -> DriverResult<Box<dyn Statement + '_>>;

    /// Releases the connection.
    fn close(&mut self) -> DriverResult<()>;
}

/// A statement handle. Each handle runs one SQL string.
pub trait Statement {
    /// Runs a query expected to produce rows.
    fn execute_query(&mut self, sql: &str) -> DriverResult<Box<dyn Cursor + '_>>;

    /// Runs a statement expected to produce only an affected-row count.
    fn execute_update(&mut self, sql: &str) -> DriverResult<u64>;

    /// Releases the statement.
    fn close(&mut self) -> DriverResult<()>;
}

/// A forward-only cursor over the rows of a query result.
pub trait Cursor {
    fn metadata(&self) -> DriverResult<ResultMetadata>;

    /// Advances to the next row. `None` once the cursor is exhausted.
    fn next_row(&mut self) -> DriverResult<Option<Row>>;

    /// Releases the cursor.
    fn close(&mut self) -> DriverResult<()>;
}
