//! Source table lookup for query results.
//!
//! sqlx does not report which table a result column came from, so the table
//! name printed above a result is taken from the query text instead.

use sqlparser::ast::{ObjectName, Query, SetExpr, Statement, TableFactor};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

/// Returns the first table named in the query's `FROM` clause.
///
/// Returns `None` when the SQL does not parse or reads from no table.
pub(crate) fn source_table(sql: &str) -> Option<String> {
    let statements = Parser::parse_sql(&GenericDialect {}, sql).ok()?;
    match statements.first()? {
        Statement::Query(query) => query_table(query),
        _ => None,
    }
}

fn query_table(query: &Query) -> Option<String> {
    set_expr_table(&query.body)
}

fn set_expr_table(body: &SetExpr) -> Option<String> {
    match body {
        SetExpr::Select(select) => select.from.iter().find_map(|from| match &from.relation {
            TableFactor::Table { name, .. } => Some(unqualified(name)),
            TableFactor::Derived { subquery, .. } => query_table(subquery),
            _ => None,
        }),
        SetExpr::Query(query) => query_table(query),
        SetExpr::SetOperation { left, .. } => set_expr_table(left),
        _ => None,
    }
}

fn unqualified(name: &ObjectName) -> String {
    name.0.last().map(|ident| ident.value.clone()).unwrap_or_default()
}
