//! Operations: the executable units a fixture is made of.
//!
//! An [`Operation`] is immutable once built. Operations compare structurally and
//! render as the SQL they run (inserts render their full description), which is
//! what [`DbSetupTracker`](crate::DbSetupTracker) relies on to detect an unchanged
//! fixture.

mod delete;
mod insert;
mod sql;
mod truncate;

pub use delete::{Delete, DeleteAll};
pub use insert::{Insert, InsertBuilder, RowBuilder, RowRepeater};
pub use sql::SqlOperation;
pub use truncate::Truncate;

use crate::bind::BinderConfiguration;
use crate::connection::Connection;
use crate::error::SetupResult;
use std::fmt;

/// Any fixture operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert(Insert),
    Delete(Delete),
    DeleteAll(DeleteAll),
    Truncate(Truncate),
    Sql(SqlOperation),
    /// Operations executed in order. Empty, it does nothing.
    Sequence(Vec<Operation>),
}

impl Operation {
    /// The operation that does nothing.
    pub fn nop() -> Self {
        Operation::Sequence(Vec::new())
    }

    /// Execute on `connection`, which is expected to be inside a transaction.
    ///
    /// Stops at the first failure.
    pub async fn execute<C: Connection>(
        &self,
        connection: &C,
        configuration: &dyn BinderConfiguration,
    ) -> SetupResult<()> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        for operation in leaves {
            match operation {
                Operation::Insert(insert) => insert.execute(connection, configuration).await?,
                Operation::Delete(delete) => execute_sql(connection, &delete.sql()).await?,
                Operation::DeleteAll(delete) => execute_sql(connection, &delete.sql()).await?,
                Operation::Truncate(truncate) => execute_sql(connection, &truncate.sql()).await?,
                Operation::Sql(sql) => execute_sql(connection, sql.sql()).await?,
                Operation::Sequence(_) => {}
            }
        }
        Ok(())
    }

    /// Non-sequence operations in execution order.
    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Operation>) {
        match self {
            Operation::Sequence(operations) => {
                for operation in operations {
                    operation.collect_leaves(out);
                }
            }
            leaf => out.push(leaf),
        }
    }
}

async fn execute_sql<C: Connection>(connection: &C, sql: &str) -> SetupResult<()> {
    connection.batch_execute(sql).await?;
    tracing::debug!(target: "pgfixture.sql", sql = %sql, "statement executed");
    Ok(())
}

/// Combine operations into one executed in order.
///
/// No operation gives [`Operation::nop`], a single operation is returned as is.
pub fn sequence_of<I>(operations: I) -> Operation
where
    I: IntoIterator,
    I::Item: Into<Operation>,
{
    let mut operations: Vec<Operation> = operations.into_iter().map(Into::into).collect();
    if operations.len() == 1 {
        if let Some(operation) = operations.pop() {
            return operation;
        }
    }
    Operation::Sequence(operations)
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Insert(op) => fmt::Display::fmt(op, f),
            Operation::Delete(op) => fmt::Display::fmt(op, f),
            Operation::DeleteAll(op) => fmt::Display::fmt(op, f),
            Operation::Truncate(op) => fmt::Display::fmt(op, f),
            Operation::Sql(op) => fmt::Display::fmt(op, f),
            Operation::Sequence(operations) if operations.is_empty() => f.write_str("NOP"),
            Operation::Sequence(operations) => {
                for (i, operation) in operations.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    fmt::Display::fmt(operation, f)?;
                }
                Ok(())
            }
        }
    }
}

macro_rules! impl_from_operation {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for Operation {
                fn from(op: $ty) -> Self {
                    Operation::$ty(op)
                }
            }
        )*
    };
}

impl_from_operation!(Insert, Delete, DeleteAll, Truncate);

impl From<SqlOperation> for Operation {
    fn from(op: SqlOperation) -> Self {
        Operation::Sql(op)
    }
}

impl From<Vec<Operation>> for Operation {
    fn from(operations: Vec<Operation>) -> Self {
        sequence_of(operations)
    }
}
