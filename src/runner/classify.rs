//! Query classification.

/// Whether a query is expected to yield a tabular result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Yields rows; executed as a query and delivered as a result set.
    Producing,
    /// Yields only an affected-row count; the continuation receives `None`.
    NonProducing,
}

impl QueryKind {
    /// Classifies a query by looking for `select` anywhere in its text,
    /// ignoring case.
    ///
    /// This is a substring test, not a parse: `INSERT INTO selections ...`
    /// counts as producing, as does a `select` inside a string literal. Use
    /// an explicit kind where that matters.
    pub fn classify(sql: &str) -> Self {
        if sql.to_lowercase().contains("select") {
            Self::Producing
        } else {
            Self::NonProducing
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Producing => "producing",
            Self::NonProducing => "non-producing",
        }
    }
}
