//! The tabular result handed to continuations.

use crate::db::{Cursor, QueryResult, ResultMetadata, Row};
use crate::error::{Result, RunnerError};

/// A forward-only view over the rows of a producing query.
///
/// Only lives for the duration of the continuation call; the runner closes
/// the underlying cursor once the continuation returns.
pub struct ResultSet<'a> {
    cursor: &'a mut dyn Cursor,
    metadata: ResultMetadata,
}

impl<'a> ResultSet<'a> {
    /// Wraps a cursor, reading its metadata up front.
    pub fn new(cursor: &'a mut dyn Cursor) -> Result<Self> {
        let metadata = cursor
            .metadata()
            .map_err(|e| RunnerError::statement("reading result metadata", e))?;
        Ok(Self { cursor, metadata })
    }

    pub fn table_name(&self) -> &str {
        &self.metadata.table_name
    }

    pub fn column_names(&self) -> &[String] {
        &self.metadata.column_names
    }

    /// Advances to the next row, returning `None` once exhausted.
    pub fn next_row(&mut self) -> Result<Option<Row>> {
        self.cursor
            .next_row()
            .map_err(|e| RunnerError::statement("reading next row", e))
    }

    /// Drains the remaining rows into a `QueryResult`.
    pub fn collect_rows(&mut self) -> Result<QueryResult> {
        let mut rows = Vec::new();
        while let Some(row) = self.next_row()? {
            rows.push(row);
        }
        Ok(QueryResult::with_data(self.metadata.clone(), rows))
    }
}

impl Iterator for ResultSet<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}
