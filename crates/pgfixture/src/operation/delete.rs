use super::Operation;
use super::insert::Insert;
use crate::error::{SetupError, SetupResult};
use std::fmt;

/// Deletes every row of a table: `delete from <table>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeleteAll {
    table: String,
}

impl DeleteAll {
    pub fn from_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    /// One `DeleteAll` per table, in the given order.
    pub fn from_tables<I, S>(tables: I) -> Operation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        super::sequence_of(tables.into_iter().map(Self::from_table))
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn sql(&self) -> String {
        format!("delete from {}", self.table)
    }
}

impl fmt::Display for DeleteAll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "delete from {}", self.table)
    }
}

/// Deletes the rows of an insert, identified by one of its columns:
/// `delete from <table> where <pk> in (<v1>, <v2>, ...)`.
///
/// The key values are spliced into the statement using their `Display` rendering,
/// without quoting or escaping. Text keys therefore only work when the column
/// accepts them unquoted (numbers, or a server-side cast); use [`SqlOperation`](super::SqlOperation)
/// for anything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Delete {
    insert: Insert,
    pk_column: String,
}

impl Delete {
    /// Fails with an invalid argument if `pk_column` is not an explicit column of
    /// `insert`, and with an illegal state if `insert` has no row.
    pub fn from_insert(insert: &Insert, pk_column: impl Into<String>) -> SetupResult<Self> {
        let pk_column = pk_column.into();
        if !insert.columns().contains(&pk_column) {
            return Err(SetupError::invalid_argument(format!(
                "insert operation should contain a column named '{pk_column}'"
            )));
        }
        if insert.row_count() == 0 {
            return Err(SetupError::illegal_state(
                "insert operation should contain at least one row to delete",
            ));
        }
        Ok(Self {
            insert: insert.clone(),
            pk_column,
        })
    }

    pub fn table(&self) -> &str {
        self.insert.table()
    }

    pub fn pk_column(&self) -> &str {
        &self.pk_column
    }

    pub fn sql(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Delete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "delete from {} where {} in (", self.insert.table(), self.pk_column)?;
        let index = self
            .insert
            .columns()
            .iter()
            .position(|c| *c == self.pk_column);
        if let Some(index) = index {
            for (i, row) in self.insert.rows().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", row[index])?;
            }
        }
        f.write_str(")")
    }
}
