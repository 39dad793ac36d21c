use super::Operation;
use std::fmt;

/// A raw SQL statement, executed as is.
///
/// Handy for what the other operations don't cover: deferring constraints,
/// resetting sequences, inserting into tables that reference each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SqlOperation {
    sql: String,
}

impl SqlOperation {
    pub fn of(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }

    /// One `SqlOperation` per statement, in the given order.
    pub fn all<I, S>(statements: I) -> Operation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        super::sequence_of(statements.into_iter().map(Self::of))
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl fmt::Display for SqlOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
