//! Statement execution with continuation delivery.
//!
//! Each execution classifies the query, runs it on a fresh statement, hands
//! the result (or `None`) to the continuation exactly once, and releases the
//! cursor and statement in reverse order of acquisition on every exit path.
//! Driver faults come back as [`RunnerError::Connection`] or
//! [`RunnerError::Statement`].

mod classify;
pub mod continuations;
mod connector;
mod result_set;
mod scope;

pub use classify::QueryKind;
pub use connector::Connector;
pub use continuations::{action, discard, print_message, render_table, render_table_to};
pub use result_set::ResultSet;

use std::time::Instant;

use tracing::debug;

use crate::config::ConnectionParams;
use crate::db::{Connection, Driver, QueryResult, SqlxDriver, Statement};
use crate::error::{Result, RunnerError};
use scope::{settle, Scoped};

/// What a query produced, as returned by [`fetch`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    /// The materialised result of a producing query.
    Rows(QueryResult),
    /// The statement produced no result set.
    NoResult,
}

impl QueryOutput {
    pub fn rows(&self) -> Option<&QueryResult> {
        match self {
            Self::Rows(result) => Some(result),
            Self::NoResult => None,
        }
    }
}

/// Runs `query` on an open connection and passes the outcome to `f`.
///
/// The query is classified with [`QueryKind::classify`].
pub fn execute<F>(connection: &mut dyn Connection, query: &str, f: F) -> Result<()>
where
    F: FnOnce(Option<&mut ResultSet<'_>>) -> Result<()>,
{
    execute_as(connection, QueryKind::classify(query), query, f)
}

/// Runs `query` as the given kind, skipping classification.
pub fn execute_as<F>(connection: &mut dyn Connection, kind: QueryKind, query: &str, f: F) -> Result<()>
where
    F: FnOnce(Option<&mut ResultSet<'_>>) -> Result<()>,
{
    debug!("Executing {} statement: {}", kind.as_str(), query);

    let statement = connection
        .create_statement()
        .map_err(|e| RunnerError::statement("creating statement", e))?;
    let mut statement = Scoped::new(statement);

    let outcome = match kind {
        QueryKind::NonProducing => statement
            .execute_update(query)
            .map_err(|e| RunnerError::statement("executing update", e))
            .and_then(|affected| {
                debug!("Statement affected {} rows", affected);
                f(None)
            }),
        QueryKind::Producing => deliver_rows(&mut statement, query, f),
    };

    let released = statement.release();
    settle(outcome, released)
}

fn deliver_rows<F>(statement: &mut Scoped<dyn Statement + '_>, query: &str, f: F) -> Result<()>
where
    F: FnOnce(Option<&mut ResultSet<'_>>) -> Result<()>,
{
    let cursor = statement
        .execute_query(query)
        .map_err(|e| RunnerError::statement("executing query", e))?;
    let mut cursor = Scoped::new(cursor);

    let outcome = ResultSet::new(&mut *cursor).and_then(|mut result_set| f(Some(&mut result_set)));

    let released = cursor.release();
    settle(outcome, released)
}

/// Runs `query` and returns its output instead of calling a continuation.
pub fn fetch(connection: &mut dyn Connection, query: &str) -> Result<QueryOutput> {
    fetch_as(connection, QueryKind::classify(query), query)
}

/// Like [`fetch`], with an explicit query kind.
pub fn fetch_as(connection: &mut dyn Connection, kind: QueryKind, query: &str) -> Result<QueryOutput> {
    let start = Instant::now();
    let mut output = QueryOutput::NoResult;

    execute_as(connection, kind, query, |result| {
        if let Some(result_set) = result {
            let rows = result_set.collect_rows()?.with_execution_time(start.elapsed());
            output = QueryOutput::Rows(rows);
        }
        Ok(())
    })?;

    Ok(output)
}

/// Opens a connection with `driver`, runs one query, and closes it again.
///
/// Nothing is executed when the connection cannot be established.
pub fn connect_execute_with<F>(driver: &dyn Driver, params: &ConnectionParams, query: &str, f: F) -> Result<()>
where
    F: FnOnce(Option<&mut ResultSet<'_>>) -> Result<()>,
{
    let connector = Connector::open_with(driver, params)?;
    connector.execute_once(query, f)
}

/// Opens a connection to `params`, runs one query, and closes it again.
pub fn connect_execute<F>(params: &ConnectionParams, query: &str, f: F) -> Result<()>
where
    F: FnOnce(Option<&mut ResultSet<'_>>) -> Result<()>,
{
    connect_execute_with(&SqlxDriver::new(), params, query, f)
}

/// [`connect_execute`] with the default connection parameters.
pub fn connect_execute_default<F>(query: &str, f: F) -> Result<()>
where
    F: FnOnce(Option<&mut ResultSet<'_>>) -> Result<()>,
{
    connect_execute(&ConnectionParams::default(), query, f)
}
