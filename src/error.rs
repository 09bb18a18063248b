//! Error types for sql-runner.
//!
//! Every driver fault is wrapped into one of two kinds, depending on whether it
//! happened while handling the connection or while running a statement.

use thiserror::Error;

/// An opaque fault raised by the underlying database driver.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by driver-level operations.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Main error type for sql-runner operations.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Opening or closing a connection failed.
    #[error("Connection error: {context}: {source}")]
    Connection {
        context: String,
        #[source]
        source: DriverError,
    },

    /// Running a statement, reading its cursor, or releasing either failed.
    #[error("Statement error: {context}: {source}")]
    Statement {
        context: String,
        #[source]
        source: DriverError,
    },

    /// Configuration errors (invalid config file, bad connection string, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Writing rendered output failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

impl RunnerError {
    /// Wraps a driver fault raised while opening or closing a connection.
    pub fn connection(context: impl Into<String>, source: impl Into<DriverError>) -> Self {
        Self::Connection {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Wraps a driver fault raised while running a statement.
    pub fn statement(context: impl Into<String>, source: impl Into<DriverError>) -> Self {
        Self::Statement {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "Connection Error",
            Self::Statement { .. } => "Statement Error",
            Self::Config(_) => "Configuration Error",
            Self::Output(_) => "Output Error",
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    pub fn is_statement(&self) -> bool {
        matches!(self, Self::Statement { .. })
    }
}

/// Result type alias using RunnerError.
pub type Result<T> = std::result::Result<T, RunnerError>;
