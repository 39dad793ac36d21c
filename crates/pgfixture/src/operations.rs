//! Shorthand constructors, meant to be glob-imported.
//!
//! ```ignore
//! use pgfixture::operations::*;
//!
//! let operation = sequence_of([
//!     truncate_tables(["invoice", "client"]),
//!     sql("alter sequence client_seq restart with 1").into(),
//!     insert_into("client").columns(["id", "name"])?.values((1, "Acme"))?.build()?.into(),
//! ]);
//! ```

use crate::error::SetupResult;
use crate::operation::{Delete, DeleteAll, Insert, InsertBuilder, Operation, SqlOperation, Truncate};

pub use crate::operation::sequence_of;

pub fn insert_into(table: impl Into<String>) -> InsertBuilder {
    Insert::builder(table)
}

pub fn delete_all_from(table: impl Into<String>) -> DeleteAll {
    DeleteAll::from_table(table)
}

pub fn delete_all_from_tables<I, S>(tables: I) -> Operation
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    DeleteAll::from_tables(tables)
}

/// Delete the rows of `insert`, matched on `pk_column`.
pub fn delete_from(insert: &Insert, pk_column: impl Into<String>) -> SetupResult<Delete> {
    Delete::from_insert(insert, pk_column)
}

pub fn truncate(table: impl Into<String>) -> Truncate {
    Truncate::table(table)
}

pub fn truncate_tables<I, S>(tables: I) -> Operation
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Truncate::tables(tables)
}

pub fn sql(statement: impl Into<String>) -> SqlOperation {
    SqlOperation::of(statement)
}

pub fn sql_statements<I, S>(statements: I) -> Operation
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    SqlOperation::all(statements)
}
