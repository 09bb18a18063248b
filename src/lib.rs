//! sql-runner - run SQL statements and hand their results to continuations.
//!
//! Statements run either on a fresh connection per call
//! ([`runner::connect_execute`]) or on a [`runner::Connector`] that keeps one
//! connection open across calls.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod runner;
