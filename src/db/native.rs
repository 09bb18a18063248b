//! sqlx-backed driver.
//!
//! Opens a typed sqlx connection for the address's scheme: MySQL, PostgreSQL
//! or SQLite. Each connection owns a current-thread tokio runtime and blocks
//! on it, which keeps the public API synchronous.

use std::time::Instant;

use sqlx::mysql::MySqlConnection;
use sqlx::postgres::PgConnection;
use sqlx::sqlite::SqliteConnection;
use sqlx::{Column as SqlxColumn, Connection as SqlxConnection, Database, Executor, Row as SqlxRow};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use super::convert::{mysql_row, postgres_row, sqlite_row};
use super::relation::source_table;
use super::{Connection, Cursor, Driver, ResultMetadata, Row, Statement};
use crate::config::ConnectionParams;
use crate::error::DriverResult;

/// Opens connections through sqlx.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlxDriver;

impl SqlxDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Driver for SqlxDriver {
    fn connect(&self, params: &ConnectionParams) -> DriverResult<Box<dyn Connection>> {
        let conn_str = params.to_connection_string()?;
        let runtime = Builder::new_current_thread().enable_all().build()?;

        let start = Instant::now();
        let backend = runtime.block_on(Backend::connect(params.scheme(), &conn_str))?;
        debug!(
            "Connected to {} ({}) in {:?}",
            params.display_string(),
            backend.name(),
            start.elapsed()
        );

        Ok(Box::new(NativeConnection {
            backend: Some(backend),
            runtime,
        }))
    }
}

/// A typed sqlx connection.
enum Backend {
    MySql(MySqlConnection),
    Postgres(PgConnection),
    Sqlite(SqliteConnection),
}

impl Backend {
    async fn connect(scheme: &str, conn_str: &str) -> DriverResult<Self> {
        match scheme {
            "mysql" => Ok(Self::MySql(MySqlConnection::connect(conn_str).await?)),
            "postgres" | "postgresql" => Ok(Self::Postgres(PgConnection::connect(conn_str).await?)),
            "sqlite" => Ok(Self::Sqlite(SqliteConnection::connect(conn_str).await?)),
            other => Err(format!("unsupported database scheme '{other}'").into()),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::MySql(_) => "MySQL",
            Self::Postgres(_) => "PostgreSQL",
            Self::Sqlite(_) => "SQLite",
        }
    }

    /// Runs a query, returning its column names and converted rows.
    async fn query(&mut self, sql: &str) -> sqlx::Result<(Vec<String>, Vec<Row>)> {
        match self {
            Self::MySql(conn) => fetch_rows::<sqlx::MySql>(conn, sql, mysql_row).await,
            Self::Postgres(conn) => fetch_rows::<sqlx::Postgres>(conn, sql, postgres_row).await,
            Self::Sqlite(conn) => fetch_rows::<sqlx::Sqlite>(conn, sql, sqlite_row).await,
        }
    }

    /// Runs a statement, returning the number of affected rows.
    async fn execute(&mut self, sql: &str) -> sqlx::Result<u64> {
        let affected = match self {
            Self::MySql(conn) => Executor::execute(&mut *conn, sql).await?.rows_affected(),
            Self::Postgres(conn) => Executor::execute(&mut *conn, sql).await?.rows_affected(),
            Self::Sqlite(conn) => Executor::execute(&mut *conn, sql).await?.rows_affected(),
        };
        Ok(affected)
    }

    async fn close(self) -> sqlx::Result<()> {
        match self {
            Self::MySql(conn) => conn.close().await,
            Self::Postgres(conn) => conn.close().await,
            Self::Sqlite(conn) => conn.close().await,
        }
    }
}

/// Fetches every row of `sql` with the simple (unprepared) protocol.
///
/// Column names come from the first row, or from `describe` when the result
/// is empty.
async fn fetch_rows<DB>(
    conn: &mut DB::Connection,
    sql: &str,
    convert: fn(&DB::Row) -> Row,
) -> sqlx::Result<(Vec<String>, Vec<Row>)>
where
    DB: Database,
    for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
{
    let start = Instant::now();
    let rows: Vec<DB::Row> = Executor::fetch_all(&mut *conn, sql).await?;
    debug!("Query returned {} rows in {:?}", rows.len(), start.elapsed());

    let column_names = match rows.first() {
        Some(row) => row.columns().iter().map(|col| col.name().to_string()).collect(),
        None => match Executor::describe(&mut *conn, sql).await {
            Ok(describe) => describe.columns().iter().map(|col| col.name().to_string()).collect(),
            Err(e) => {
                debug!("Could not describe empty result: {}", e);
                Vec::new()
            }
        },
    };

    Ok((column_names, rows.iter().map(convert).collect()))
}

struct NativeConnection {
    /// `None` once closed. Declared first so it drops before the runtime.
    backend: Option<Backend>,
    runtime: Runtime,
}

impl Connection for NativeConnection {
    fn create_statement(&mut self) -> DriverResult<Box<dyn Statement + '_>> {
        let backend = self.backend.as_mut().ok_or("connection is closed")?;
        Ok(Box::new(NativeStatement {
            runtime: &self.runtime,
            backend,
            closed: false,
        }))
    }

    fn close(&mut self) -> DriverResult<()> {
        if let Some(backend) = self.backend.take() {
            self.runtime.block_on(backend.close())?;
        }
        Ok(())
    }
}

/// A statement scope on a borrowed connection.
///
/// sqlx has no separate statement object for unprepared SQL; the handle only
/// enforces that nothing runs after it was closed.
struct NativeStatement<'c> {
    runtime: &'c Runtime,
    backend: &'c mut Backend,
    closed: bool,
}

impl NativeStatement<'_> {
    fn ensure_open(&self) -> DriverResult<()> {
        if self.closed {
            return Err("statement is closed".into());
        }
        Ok(())
    }
}

impl Statement for NativeStatement<'_> {
    fn execute_query(&mut self, sql: &str) -> DriverResult<Box<dyn Cursor + '_>> {
        self.ensure_open()?;
        let (column_names, rows) = self.runtime.block_on(self.backend.query(sql))?;

        let metadata = ResultMetadata {
            table_name: source_table(sql).unwrap_or_default(),
            column_names,
        };

        Ok(Box::new(NativeCursor {
            metadata,
            rows: rows.into_iter(),
            closed: false,
        }))
    }

    fn execute_update(&mut self, sql: &str) -> DriverResult<u64> {
        self.ensure_open()?;
        Ok(self.runtime.block_on(self.backend.execute(sql))?)
    }

    fn close(&mut self) -> DriverResult<()> {
        self.closed = true;
        Ok(())
    }
}

/// A cursor over the rows fetched by one query.
struct NativeCursor {
    metadata: ResultMetadata,
    rows: std::vec::IntoIter<Row>,
    closed: bool,
}

impl Cursor for NativeCursor {
    fn metadata(&self) -> DriverResult<ResultMetadata> {
        Ok(self.metadata.clone())
    }

    fn next_row(&mut self) -> DriverResult<Option<Row>> {
        if self.closed {
            return Err("cursor is closed".into());
        }
        Ok(self.rows.next())
    }

    fn close(&mut self) -> DriverResult<()> {
        self.closed = true;
        self.rows = Vec::new().into_iter();
        Ok(())
    }
}
