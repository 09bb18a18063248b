//! Ready-made continuations.
//!
//! A continuation receives `Some(result_set)` after a producing query and
//! `None` after any other statement.

use std::io::{self, Write};

use super::ResultSet;
use crate::error::Result;

/// Line written by `render_table` when the statement produced no result.
pub const NO_OUTPUT_NOTICE: &str = "query output is null";

/// Prints the result to stdout as a tab-separated table.
pub fn render_table(result: Option<&mut ResultSet<'_>>) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_table_to(&mut out, result)
}

/// Writes the result as a tab-separated table.
///
/// The output is built in full before anything is written, so a cursor
/// failure part way through leaves `out` untouched.
pub fn render_table_to<W: Write + ?Sized>(
    out: &mut W,
    result: Option<&mut ResultSet<'_>>,
) -> Result<()> {
    let Some(result_set) = result else {
        writeln!(out, "{NO_OUTPUT_NOTICE}")?;
        return Ok(());
    };

    let mut table = format!("Tabla '{}':\n", result_set.table_name());
    table.push_str(&result_set.column_names().join("\t"));
    table.push('\n');

    while let Some(row) = result_set.next_row()? {
        let cells: Vec<String> = row.iter().map(|value| value.to_display_string()).collect();
        table.push_str(&cells.join("\t"));
        table.push('\n');
    }

    out.write_all(table.as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Does nothing.
pub fn discard(_result: Option<&mut ResultSet<'_>>) -> Result<()> {
    Ok(())
}

/// Turns a zero-argument action into a continuation that ignores its input.
pub fn action<A>(f: A) -> impl FnOnce(Option<&mut ResultSet<'_>>) -> Result<()>
where
    A: FnOnce(),
{
    move |_| {
        f();
        Ok(())
    }
}

/// A continuation that prints `message` once the statement has run.
pub fn print_message(message: impl Into<String>) -> impl FnOnce(Option<&mut ResultSet<'_>>) -> Result<()> {
    let message = message.into();
    action(move || println!("{message}"))
}
