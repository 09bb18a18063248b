//! Mock database driver for testing.
//!
//! Every producing query returns the same scripted rows. The driver records
//! each acquire and release in an event log shared by all handles it created,
//! and can be told to fail at any step.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use super::{Connection, Cursor, Driver, ResultMetadata, Row, Statement};
use crate::config::ConnectionParams;
use crate::error::{DriverError, DriverResult};

/// A driver call recorded by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Connect,
    CreateStatement,
    ExecuteQuery(String),
    ExecuteUpdate(String),
    CloseCursor,
    CloseStatement,
    CloseConnection,
}

/// A point at which the mock can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Connect,
    CreateStatement,
    Execute,
    Metadata,
    NextRow,
    CloseCursor,
    CloseStatement,
    CloseConnection,
}

#[derive(Clone, Default)]
struct Script {
    metadata: ResultMetadata,
    rows: Vec<Row>,
    affected: u64,
    failures: HashSet<Step>,
}

/// State shared by a driver and every handle it created.
#[derive(Clone, Default)]
struct Shared {
    script: Rc<Script>,
    events: Rc<RefCell<Vec<Event>>>,
}

impl Shared {
    fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    fn check(&self, step: Step) -> DriverResult<()> {
        if self.script.failures.contains(&step) {
            return Err(injected(step));
        }
        Ok(())
    }
}

fn injected(step: Step) -> DriverError {
    format!("injected failure at {step:?}").into()
}

/// A driver whose connections answer from a script.
///
/// Clones share the event log.
#[derive(Clone, Default)]
pub struct MockDriver {
    shared: Shared,
}

impl MockDriver {
    /// Creates a mock with no rows and no failures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the result returned by every producing query.
    pub fn with_rows(mut self, metadata: ResultMetadata, rows: Vec<Row>) -> Self {
        let script = self.script_mut();
        script.metadata = metadata;
        script.rows = rows;
        self
    }

    /// Sets the affected-row count returned by every update.
    pub fn with_affected(mut self, affected: u64) -> Self {
        self.script_mut().affected = affected;
        self
    }

    /// Makes the given step fail.
    pub fn fail_on(mut self, step: Step) -> Self {
        self.script_mut().failures.insert(step);
        self
    }

    fn script_mut(&mut self) -> &mut Script {
        Rc::make_mut(&mut self.shared.script)
    }

    /// Returns the recorded events, oldest first.
    pub fn events(&self) -> Vec<Event> {
        self.shared.events.borrow().clone()
    }

    /// Counts how often `event` was recorded.
    pub fn count(&self, event: &Event) -> usize {
        self.shared.events.borrow().iter().filter(|e| *e == event).count()
    }

    /// Returns true if every statement and cursor acquired so far was closed.
    pub fn is_balanced(&self) -> bool {
        let events = self.shared.events.borrow();
        let count = |pred: fn(&Event) -> bool| events.iter().filter(|e| pred(e)).count();

        count(|e| matches!(e, Event::CreateStatement)) == count(|e| matches!(e, Event::CloseStatement))
            && count(|e| matches!(e, Event::ExecuteQuery(_))) == count(|e| matches!(e, Event::CloseCursor))
    }
}

impl Driver for MockDriver {
    fn connect(&self, _params: &ConnectionParams) -> DriverResult<Box<dyn Connection>> {
        self.shared.check(Step::Connect)?;
        self.shared.record(Event::Connect);
        Ok(Box::new(MockConnection {
            state: self.shared.clone(),
            closed: false,
        }))
    }
}

struct MockConnection {
    state: Shared,
    closed: bool,
}

impl Connection for MockConnection {
    fn create_statement(&mut self) -> DriverResult<Box<dyn Statement + '_>> {
        if self.closed {
            return Err("connection is closed".into());
        }
        self.state.check(Step::CreateStatement)?;
        self.state.record(Event::CreateStatement);
        Ok(Box::new(MockStatement {
            state: &self.state,
            closed: false,
        }))
    }

    fn close(&mut self) -> DriverResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.state.record(Event::CloseConnection);
        self.state.check(Step::CloseConnection)
    }
}

struct MockStatement<'c> {
    state: &'c Shared,
    closed: bool,
}

impl Statement for MockStatement<'_> {
    fn execute_query(&mut self, sql: &str) -> DriverResult<Box<dyn Cursor + '_>> {
        self.state.check(Step::Execute)?;
        self.state.record(Event::ExecuteQuery(sql.to_string()));
        Ok(Box::new(MockCursor {
            state: Some(self.state.clone()),
            metadata: self.state.script.metadata.clone(),
            rows: self.state.script.rows.iter().cloned().collect(),
            rows_before_failure: None,
            closed: false,
        }))
    }

    fn execute_update(&mut self, sql: &str) -> DriverResult<u64> {
        self.state.check(Step::Execute)?;
        self.state.record(Event::ExecuteUpdate(sql.to_string()));
        Ok(self.state.script.affected)
    }

    fn close(&mut self) -> DriverResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.state.record(Event::CloseStatement);
        self.state.check(Step::CloseStatement)
    }
}

/// A cursor over scripted rows.
pub struct MockCursor {
    state: Option<Shared>,
    metadata: ResultMetadata,
    rows: VecDeque<Row>,
    rows_before_failure: Option<usize>,
    closed: bool,
}

impl MockCursor {
    /// Creates a cursor that belongs to no driver and records nothing.
    pub fn detached(metadata: ResultMetadata, rows: Vec<Row>) -> Self {
        Self {
            state: None,
            metadata,
            rows: rows.into(),
            rows_before_failure: None,
            closed: false,
        }
    }

    /// Makes `next_row` fail once `rows` rows have been read.
    pub fn failing_after(mut self, rows: usize) -> Self {
        self.rows_before_failure = Some(rows);
        self
    }

    fn check(&self, step: Step) -> DriverResult<()> {
        match &self.state {
            Some(state) => state.check(step),
            None => Ok(()),
        }
    }
}

impl Cursor for MockCursor {
    fn metadata(&self) -> DriverResult<ResultMetadata> {
        self.check(Step::Metadata)?;
        Ok(self.metadata.clone())
    }

    fn next_row(&mut self) -> DriverResult<Option<Row>> {
        if self.closed {
            return Err("cursor is closed".into());
        }
        self.check(Step::NextRow)?;
        if let Some(remaining) = self.rows_before_failure.as_mut() {
            if *remaining == 0 {
                return Err(injected(Step::NextRow));
            }
            *remaining -= 1;
        }
        Ok(self.rows.pop_front())
    }

    fn close(&mut self) -> DriverResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match &self.state {
            Some(state) => {
                state.record(Event::CloseCursor);
                state.check(Step::CloseCursor)
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Value;

    #[test]
    fn test_mock_records_lifecycle() {
        let driver = MockDriver::new().with_affected(3);
        let mut connection = driver.connect(&ConnectionParams::default()).unwrap();

        {
            let mut statement = connection.create_statement().unwrap();
            assert_eq!(statement.execute_update("DELETE FROM t").unwrap(), 3);
            statement.close().unwrap();
            statement.close().unwrap();
        }
        connection.close().unwrap();

        assert_eq!(
            driver.events(),
            vec![
                Event::Connect,
                Event::CreateStatement,
                Event::ExecuteUpdate("DELETE FROM t".into()),
                Event::CloseStatement,
                Event::CloseConnection,
            ]
        );
    }

    #[test]
    fn test_mock_cursor_yields_scripted_rows() {
        let driver = MockDriver::new().with_rows(ResultMetadata::new("t", ["a"]), vec![vec![Value::Int(1)]]);
        let mut connection = driver.connect(&ConnectionParams::default()).unwrap();
        let mut statement = connection.create_statement().unwrap();
        let mut cursor = statement.execute_query("SELECT a FROM t").unwrap();

        assert_eq!(cursor.metadata().unwrap().column_names, vec!["a"]);
        assert_eq!(cursor.next_row().unwrap(), Some(vec![Value::Int(1)]));
        assert_eq!(cursor.next_row().unwrap(), None);
        cursor.close().unwrap();
        assert!(cursor.next_row().is_err());
    }

    #[test]
    fn test_mock_failures() {
        let driver = MockDriver::new().fail_on(Step::Connect);
        assert!(driver.connect(&ConnectionParams::default()).is_err());
        assert!(driver.events().is_empty());

        let driver = MockDriver::new().fail_on(Step::CloseConnection);
        let mut connection = driver.connect(&ConnectionParams::default()).unwrap();
        assert!(connection.close().is_err());
        assert_eq!(driver.count(&Event::CloseConnection), 1);
    }

    #[test]
    fn test_detached_cursor_failing_after() {
        let mut cursor = MockCursor::detached(ResultMetadata::default(), vec![vec![], vec![]]).failing_after(1);

        assert!(cursor.next_row().unwrap().is_some());
        assert!(cursor.next_row().is_err());
    }
}
