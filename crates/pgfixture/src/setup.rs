//! Launching an operation against a destination, in one transaction.

use crate::bind::{BinderConfiguration, DefaultBinderConfiguration};
use crate::connection::Connection;
use crate::destination::Destination;
use crate::error::SetupResult;
use crate::operation::Operation;
use std::fmt;
use std::sync::Arc;

/// An operation bound to a destination.
///
/// ```ignore
/// let operation = sequence_of([
///     delete_all_from_tables(["invoice", "client"]),
///     insert_into("client")
///         .columns(["id", "name"])?
///         .values((1, "Acme"))?
///         .build()?
///         .into(),
/// ]);
/// DbSetup::new(UrlDestination::from_env()?, operation).launch().await?;
/// ```
#[derive(Debug, Clone)]
pub struct DbSetup<D> {
    destination: D,
    operation: Operation,
    binder_configuration: Arc<dyn BinderConfiguration>,
}

impl<D: Destination> DbSetup<D> {
    /// Setup using the [`DefaultBinderConfiguration`].
    pub fn new(destination: D, operation: impl Into<Operation>) -> Self {
        Self {
            destination,
            operation: operation.into(),
            binder_configuration: Arc::new(DefaultBinderConfiguration),
        }
    }

    pub fn with_binder_configuration(
        mut self,
        configuration: impl BinderConfiguration + 'static,
    ) -> Self {
        self.binder_configuration = Arc::new(configuration);
        self
    }

    pub fn destination(&self) -> &D {
        &self.destination
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn binder_configuration(&self) -> &dyn BinderConfiguration {
        &*self.binder_configuration
    }

    /// Run the operation in a transaction, committed on success.
    ///
    /// On any failure the transaction is rolled back and the original error is
    /// returned; a failing rollback is only logged. The connection is released in
    /// every case.
    pub async fn launch(&self) -> SetupResult<()> {
        let connection = self.destination.connection().await?;
        tracing::debug!(target: "pgfixture.setup", operation = %self.operation, "launching setup");

        let result = async {
            connection.begin().await?;
            self.operation
                .execute(&connection, &*self.binder_configuration)
                .await?;
            connection.commit().await
        }
        .await;

        match result {
            Ok(()) => {
                tracing::debug!(target: "pgfixture.setup", "setup committed");
                Ok(())
            }
            Err(err) => {
                tracing::info!(target: "pgfixture.setup", error = %err, "setup failed, rolling back");
                if let Err(rollback_err) = connection.rollback().await {
                    tracing::warn!(
                        target: "pgfixture.setup",
                        error = %rollback_err,
                        "rollback failed"
                    );
                }
                Err(err)
            }
        }
    }
}

impl<D: PartialEq> PartialEq for DbSetup<D> {
    fn eq(&self, other: &Self) -> bool {
        self.destination == other.destination
            && self.operation == other.operation
            && format!("{:?}", self.binder_configuration)
                == format!("{:?}", other.binder_configuration)
    }
}

impl<D: fmt::Debug> fmt::Display for DbSetup<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DbSetup [destination={:?}, operation={}, binderConfiguration={:?}]",
            self.destination, self.operation, self.binder_configuration
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::DisabledBinderConfiguration;
    use crate::operations::*;
    use crate::testing::{Event, Recorder, RecordingDestination};

    fn three_rows() -> Operation {
        insert_into("t")
            .columns(["a"])
            .unwrap()
            .values((1,))
            .unwrap()
            .values((2,))
            .unwrap()
            .values((3,))
            .unwrap()
            .build()
            .unwrap()
            .into()
    }

    #[tokio::test]
    async fn launch_commits_and_releases_the_connection() {
        let recorder = Recorder::new();
        let setup = DbSetup::new(
            RecordingDestination::new(recorder.clone()),
            sequence_of([truncate("a"), truncate("b")]),
        );

        setup.launch().await.unwrap();
        assert_eq!(
            recorder.events(),
            vec![
                Event::Connect,
                Event::Begin,
                Event::Batch("truncate table a".into()),
                Event::Batch("truncate table b".into()),
                Event::Commit,
                Event::Close,
            ]
        );
    }

    #[tokio::test]
    async fn failed_row_rolls_back_and_returns_its_error() {
        let recorder = Recorder::new().fail_on_execute(2);
        let setup = DbSetup::new(RecordingDestination::new(recorder.clone()), three_rows());

        let err = setup.launch().await.unwrap_err();
        assert!(err.to_string().contains("simulated failure: execute"));

        let events = recorder.events();
        assert_eq!(recorder.executions().len(), 2);
        assert!(!events.contains(&Event::Commit));
        assert_eq!(
            &events[events.len() - 3..],
            &[Event::CloseStatement, Event::Rollback, Event::Close]
        );
    }

    #[tokio::test]
    async fn failed_commit_is_rolled_back() {
        let recorder = Recorder::new().fail_on_commit();
        let setup = DbSetup::new(RecordingDestination::new(recorder.clone()), truncate("a"));

        let err = setup.launch().await.unwrap_err();
        assert!(err.to_string().contains("COMMIT"));
        assert_eq!(
            recorder.events(),
            vec![
                Event::Connect,
                Event::Begin,
                Event::Batch("truncate table a".into()),
                Event::Commit,
                Event::Rollback,
                Event::Close,
            ]
        );
    }

    #[tokio::test]
    async fn failed_rollback_keeps_the_original_error() {
        let recorder = Recorder::new()
            .fail_on_batch("truncate table a")
            .fail_on_rollback();
        let setup = DbSetup::new(RecordingDestination::new(recorder.clone()), truncate("a"));

        let err = setup.launch().await.unwrap_err();
        assert!(err.to_string().contains("truncate table a"));
        assert_eq!(recorder.events().last(), Some(&Event::Close));
    }

    #[tokio::test]
    async fn connection_failure_is_returned_untouched() {
        let recorder = Recorder::new();
        let destination = RecordingDestination {
            recorder: recorder.clone(),
            fail_to_connect: true,
        };

        let err = DbSetup::new(destination, truncate("a")).launch().await.unwrap_err();
        assert!(err.to_string().contains("connect"));
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn binder_configuration_reaches_the_operations() {
        let recorder = Recorder::new();
        let setup = DbSetup::new(RecordingDestination::new(recorder.clone()), three_rows())
            .with_binder_configuration(DisabledBinderConfiguration);

        let err = setup.launch().await.unwrap_err();
        assert!(matches!(err, crate::SetupError::Unsupported(_)));
        assert!(recorder.events().contains(&Event::Rollback));
    }

    #[test]
    fn setups_compare_all_three_parts() {
        let destination = RecordingDestination::new(Recorder::new());
        let setup = DbSetup::new(destination.clone(), truncate("a"));

        assert_eq!(setup, DbSetup::new(destination.clone(), truncate("a")));
        assert_ne!(setup, DbSetup::new(destination.clone(), truncate("b")));
        assert_ne!(
            setup,
            DbSetup::new(RecordingDestination::new(Recorder::new()), truncate("a"))
        );
        assert_ne!(
            setup,
            DbSetup::new(destination, truncate("a"))
                .with_binder_configuration(DisabledBinderConfiguration)
        );
    }

    #[test]
    fn display_shows_operation_and_configuration() {
        let setup = DbSetup::new(RecordingDestination::new(Recorder::new()), truncate("a"));
        let rendered = setup.to_string();
        assert!(rendered.starts_with("DbSetup [destination=RecordingDestination"));
        assert!(rendered.ends_with(
            ", operation=truncate table a, binderConfiguration=DefaultBinderConfiguration]"
        ));
    }
}
