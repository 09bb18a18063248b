//! A connection held open across several statements.

use tracing::{debug, info};

use super::scope::{settle, Scoped};
use super::{discard, execute_as, fetch_as, QueryKind, QueryOutput, ResultSet};
use crate::config::ConnectionParams;
use crate::db::{Connection, Driver, SqlxDriver};
use crate::error::{Result, RunnerError};

/// Owns one connection and runs statements on it in sequence.
///
/// Call [`Connector::close`] to observe close failures. A connector that is
/// dropped without being closed still closes its connection, logging any
/// failure.
pub struct Connector {
    connection: Scoped<dyn Connection>,
}

impl Connector {
    /// Connects to `params` through the sqlx-backed driver.
    pub fn open(params: &ConnectionParams) -> Result<Self> {
        Self::open_with(&SqlxDriver::new(), params)
    }

    /// Connects with the default connection parameters.
    pub fn open_default() -> Result<Self> {
        Self::open(&ConnectionParams::default())
    }

    /// Connects to `params` through the given driver.
    pub fn open_with(driver: &dyn Driver, params: &ConnectionParams) -> Result<Self> {
        info!("Connecting to {}", params.display_string());
        let connection = driver.connect(params).map_err(|e| {
            RunnerError::connection(format!("connecting to {}", params.display_string()), e)
        })?;
        Ok(Self::from_connection(connection))
    }

    /// Takes ownership of an already open connection.
    pub fn from_connection(connection: Box<dyn Connection>) -> Self {
        Self {
            connection: Scoped::new(connection),
        }
    }

    /// Runs `query` and passes its result (or `None`) to `f`.
    pub fn execute<F>(&mut self, query: &str, f: F) -> Result<()>
    where
        F: FnOnce(Option<&mut ResultSet<'_>>) -> Result<()>,
    {
        self.execute_as(QueryKind::classify(query), query, f)
    }

    /// Runs `query` as the given kind, skipping classification.
    pub fn execute_as<F>(&mut self, kind: QueryKind, query: &str, f: F) -> Result<()>
    where
        F: FnOnce(Option<&mut ResultSet<'_>>) -> Result<()>,
    {
        execute_as(&mut *self.connection, kind, query, f)
    }

    /// Runs `query` and discards any result.
    pub fn execute_discarding(&mut self, query: &str) -> Result<()> {
        self.execute(query, discard)
    }

    /// Runs `query` and returns its output.
    pub fn fetch(&mut self, query: &str) -> Result<QueryOutput> {
        fetch_as(&mut *self.connection, QueryKind::classify(query), query)
    }

    /// Closes the connection.
    pub fn close(mut self) -> Result<()> {
        debug!("Closing connector");
        self.connection.release()
    }

    /// Runs a single query, then closes the connection whatever the outcome.
    pub(crate) fn execute_once<F>(mut self, query: &str, f: F) -> Result<()>
    where
        F: FnOnce(Option<&mut ResultSet<'_>>) -> Result<()>,
    {
        let outcome = self.execute(query, f);
        let released = self.connection.release();
        settle(outcome, released)
    }
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector").finish_non_exhaustive()
    }
}
