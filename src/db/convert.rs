//! Decoding of sqlx rows into `Value`s.
//!
//! Each backend matches on the column's type name. Columns without a
//! dedicated arm (dates, decimals, JSON, ...) are decoded as text, so they
//! print the way the server formats them.

use sqlx::mysql::MySqlRow;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column as SqlxColumn, ColumnIndex, Decode, Row as SqlxRow, TypeInfo};
use tracing::debug;

use super::{Row, Value};

/// Converts a MySQL row.
pub(crate) fn mysql_row(row: &MySqlRow) -> Row {
    convert_row(row, mysql_value)
}

/// Converts a PostgreSQL row.
pub(crate) fn postgres_row(row: &PgRow) -> Row {
    convert_row(row, postgres_value)
}

/// Converts a SQLite row.
pub(crate) fn sqlite_row(row: &SqliteRow) -> Row {
    convert_row(row, sqlite_value)
}

fn convert_row<R>(row: &R, convert: fn(&R, usize, &str) -> Value) -> Row
where
    R: SqlxRow,
{
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert(row, i, col.type_info().name()))
        .collect()
}

fn mysql_value(row: &MySqlRow, index: usize, type_name: &str) -> Value {
    let typed = match type_name {
        "BOOLEAN" => decode::<_, bool>(row, index),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" | "TINYINT UNSIGNED"
        | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED" | "BIGINT UNSIGNED" => {
            decode::<_, i64>(row, index)
        }
        "FLOAT" | "DOUBLE" => decode::<_, f64>(row, index),
        "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" => {
            decode::<_, Vec<u8>>(row, index)
        }
        _ => None,
    };
    typed.unwrap_or_else(|| text(row, index, type_name))
}

fn postgres_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    let typed = match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => decode::<_, bool>(row, index),
        "INT2" | "SMALLINT" => decode::<_, i16>(row, index),
        "INT4" | "INT" | "INTEGER" => decode::<_, i32>(row, index),
        "INT8" | "BIGINT" => decode::<_, i64>(row, index),
        "FLOAT4" | "REAL" => decode::<_, f32>(row, index),
        "FLOAT8" | "DOUBLE PRECISION" => decode::<_, f64>(row, index),
        "BYTEA" => decode::<_, Vec<u8>>(row, index),
        _ => None,
    };
    typed.unwrap_or_else(|| text(row, index, type_name))
}

fn sqlite_value(row: &SqliteRow, index: usize, type_name: &str) -> Value {
    let typed = match type_name {
        "BOOLEAN" => decode::<_, bool>(row, index),
        "INTEGER" => decode::<_, i64>(row, index),
        "REAL" => decode::<_, f64>(row, index),
        "BLOB" => decode::<_, Vec<u8>>(row, index),
        _ => None,
    };
    typed.unwrap_or_else(|| text(row, index, type_name))
}

/// Decodes a column as `T`, skipping sqlx's type check.
///
/// Returns `None` when the bytes do not decode as `T`. NULL decodes as
/// `Value::Null` for every `T`.
fn decode<'r, R, T>(row: &'r R, index: usize) -> Option<Value>
where
    R: SqlxRow,
    usize: ColumnIndex<R>,
    T: Decode<'r, R::Database> + Into<Value>,
{
    row.try_get_unchecked::<Option<T>, _>(index)
        .ok()
        .map(Value::from)
}

fn text<R>(row: &R, index: usize, type_name: &str) -> Value
where
    R: SqlxRow,
    usize: ColumnIndex<R>,
    for<'r> String: Decode<'r, R::Database>,
{
    decode::<_, String>(row, index).unwrap_or_else(|| {
        debug!("Column {} of type {} is not decodable as text, showing null", index, type_name);
        Value::Null
    })
}
