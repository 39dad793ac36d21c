//! The statement boundary operations run against.
//!
//! [`Connection`] is the small set of calls fixtures need from a driver: plain
//! statements, prepared statements, parameter metadata and transaction control.
//! It is implemented for `tokio_postgres::Client`, pooled clients (feature
//! `pool`), and `Arc` of any connection.

use crate::bind::{ParameterMetadata, Parameters};
use crate::error::SetupResult;
use std::future::Future;
use std::sync::Arc;

/// A statement prepared on one connection.
///
/// Released when dropped.
pub trait PreparedStatement: Send + Sync {
    /// Parameter types reported by the server for this statement.
    fn parameter_metadata(&self) -> SetupResult<ParameterMetadata>;
}

/// A database connection operations execute on.
pub trait Connection: Send + Sync {
    type Statement: PreparedStatement;

    /// Run one or more statements without parameters.
    fn batch_execute(&self, sql: &str) -> impl Future<Output = SetupResult<()>> + Send;

    /// Prepare a parameterized statement.
    fn prepare(&self, sql: &str) -> impl Future<Output = SetupResult<Self::Statement>> + Send;

    /// Execute a prepared statement with every parameter bound; returns the affected row count.
    fn execute_prepared(
        &self,
        statement: &Self::Statement,
        params: &Parameters,
    ) -> impl Future<Output = SetupResult<u64>> + Send;

    /// Open a transaction (autocommit off).
    fn begin(&self) -> impl Future<Output = SetupResult<()>> + Send {
        self.batch_execute("BEGIN")
    }

    fn commit(&self) -> impl Future<Output = SetupResult<()>> + Send {
        self.batch_execute("COMMIT")
    }

    fn rollback(&self) -> impl Future<Output = SetupResult<()>> + Send {
        self.batch_execute("ROLLBACK")
    }
}

impl PreparedStatement for tokio_postgres::Statement {
    fn parameter_metadata(&self) -> SetupResult<ParameterMetadata> {
        Ok(ParameterMetadata::new(self.params().to_vec()))
    }
}

impl Connection for tokio_postgres::Client {
    type Statement = tokio_postgres::Statement;

    async fn batch_execute(&self, sql: &str) -> SetupResult<()> {
        tokio_postgres::Client::batch_execute(self, sql).await?;
        Ok(())
    }

    async fn prepare(&self, sql: &str) -> SetupResult<tokio_postgres::Statement> {
        Ok(tokio_postgres::Client::prepare(self, sql).await?)
    }

    async fn execute_prepared(
        &self,
        statement: &tokio_postgres::Statement,
        params: &Parameters,
    ) -> SetupResult<u64> {
        let params = params.as_refs()?;
        Ok(tokio_postgres::Client::execute(self, statement, &params).await?)
    }
}

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
impl Connection for deadpool_postgres::Client {
    type Statement = tokio_postgres::Statement;

    async fn batch_execute(&self, sql: &str) -> SetupResult<()> {
        let client: &tokio_postgres::Client = self;
        Connection::batch_execute(client, sql).await
    }

    async fn prepare(&self, sql: &str) -> SetupResult<tokio_postgres::Statement> {
        let client: &tokio_postgres::Client = self;
        Connection::prepare(client, sql).await
    }

    async fn execute_prepared(
        &self,
        statement: &tokio_postgres::Statement,
        params: &Parameters,
    ) -> SetupResult<u64> {
        let client: &tokio_postgres::Client = self;
        Connection::execute_prepared(client, statement, params).await
    }
}

impl<C: Connection> Connection for Arc<C> {
    type Statement = C::Statement;

    fn batch_execute(&self, sql: &str) -> impl Future<Output = SetupResult<()>> + Send {
        (**self).batch_execute(sql)
    }

    fn prepare(&self, sql: &str) -> impl Future<Output = SetupResult<C::Statement>> + Send {
        (**self).prepare(sql)
    }

    fn execute_prepared(
        &self,
        statement: &C::Statement,
        params: &Parameters,
    ) -> impl Future<Output = SetupResult<u64>> + Send {
        (**self).execute_prepared(statement, params)
    }

    fn begin(&self) -> impl Future<Output = SetupResult<()>> + Send {
        (**self).begin()
    }

    fn commit(&self) -> impl Future<Output = SetupResult<()>> + Send {
        (**self).commit()
    }

    fn rollback(&self) -> impl Future<Output = SetupResult<()>> + Send {
        (**self).rollback()
    }
}
