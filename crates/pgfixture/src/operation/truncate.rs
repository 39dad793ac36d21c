use super::Operation;
use std::fmt;

/// `truncate table <table>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Truncate {
    table: String,
}

impl Truncate {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    /// One `Truncate` per table, in the given order.
    pub fn tables<I, S>(tables: I) -> Operation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        super::sequence_of(tables.into_iter().map(Self::table))
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn sql(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Truncate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "truncate table {}", self.table)
    }
}
