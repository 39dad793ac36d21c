//! In-memory connection that records what operations do to it.

use crate::bind::{ParameterMetadata, Parameters, SqlParam};
use crate::connection::{Connection, PreparedStatement};
use crate::destination::Destination;
use crate::error::{SetupError, SetupResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_postgres::types::Type;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    Connect,
    Begin,
    Commit,
    Rollback,
    Batch(String),
    Prepare(String),
    Metadata,
    Execute(Vec<Option<SqlParam>>),
    CloseStatement,
    Close,
}

#[derive(Debug, Default)]
struct Behavior {
    // parameter types reported by every prepared statement; `None` fails the metadata call
    param_types: Option<Vec<Type>>,
    // 1-based index of the `execute_prepared` call that fails
    fail_on_execute: Option<usize>,
    fail_on_batch: Option<String>,
    fail_on_commit: bool,
    fail_on_rollback: bool,
}

pub(crate) fn simulated_failure(what: &str) -> SetupError {
    SetupError::Connection(format!("simulated failure: {what}"))
}

/// Shared event log plus the failures to inject.
#[derive(Debug, Clone, Default)]
pub(crate) struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
    behavior: Arc<Mutex<Behavior>>,
    executions: Arc<AtomicUsize>,
}

impl Recorder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_param_types(self, types: Vec<Type>) -> Self {
        self.behavior.lock().unwrap().param_types = Some(types);
        self
    }

    pub(crate) fn fail_on_execute(self, nth: usize) -> Self {
        self.behavior.lock().unwrap().fail_on_execute = Some(nth);
        self
    }

    pub(crate) fn fail_on_batch(self, sql: &str) -> Self {
        self.behavior.lock().unwrap().fail_on_batch = Some(sql.to_string());
        self
    }

    pub(crate) fn fail_on_commit(self) -> Self {
        self.behavior.lock().unwrap().fail_on_commit = true;
        self
    }

    pub(crate) fn fail_on_rollback(self) -> Self {
        self.behavior.lock().unwrap().fail_on_rollback = true;
        self
    }

    pub(crate) fn connection(&self) -> RecordingConnection {
        self.record(Event::Connect);
        RecordingConnection {
            recorder: self.clone(),
        }
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Parameters of every execution, in order.
    pub(crate) fn executions(&self) -> Vec<Vec<Option<SqlParam>>> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Execute(params) => Some(params),
                _ => None,
            })
            .collect()
    }

    /// SQL of every prepared or batch statement, in order.
    pub(crate) fn statements(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Prepare(sql) | Event::Batch(sql) => Some(sql),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

#[derive(Debug)]
pub(crate) struct RecordingConnection {
    recorder: Recorder,
}

impl Drop for RecordingConnection {
    fn drop(&mut self) {
        self.recorder.record(Event::Close);
    }
}

#[derive(Debug)]
pub(crate) struct RecordingStatement {
    recorder: Recorder,
    param_types: Option<Vec<Type>>,
}

impl PreparedStatement for RecordingStatement {
    fn parameter_metadata(&self) -> SetupResult<ParameterMetadata> {
        self.recorder.record(Event::Metadata);
        match &self.param_types {
            Some(types) => Ok(ParameterMetadata::new(types.clone())),
            None => Err(SetupError::Unsupported("parameter metadata".to_string())),
        }
    }
}

impl Drop for RecordingStatement {
    fn drop(&mut self) {
        self.recorder.record(Event::CloseStatement);
    }
}

impl Connection for RecordingConnection {
    type Statement = RecordingStatement;

    async fn batch_execute(&self, sql: &str) -> SetupResult<()> {
        let event = match sql {
            "BEGIN" => Event::Begin,
            "COMMIT" => Event::Commit,
            "ROLLBACK" => Event::Rollback,
            other => Event::Batch(other.to_string()),
        };
        self.recorder.record(event.clone());
        let behavior = self.recorder.behavior.lock().unwrap();
        let fails = match event {
            Event::Commit => behavior.fail_on_commit,
            Event::Rollback => behavior.fail_on_rollback,
            _ => behavior.fail_on_batch.as_deref() == Some(sql),
        };
        if fails {
            return Err(simulated_failure(sql));
        }
        Ok(())
    }

    async fn prepare(&self, sql: &str) -> SetupResult<RecordingStatement> {
        self.recorder.record(Event::Prepare(sql.to_string()));
        let param_types = self.recorder.behavior.lock().unwrap().param_types.clone();
        Ok(RecordingStatement {
            recorder: self.recorder.clone(),
            param_types,
        })
    }

    async fn execute_prepared(
        &self,
        _statement: &RecordingStatement,
        params: &Parameters,
    ) -> SetupResult<u64> {
        params.as_refs()?;
        let bound = (1..=params.len()).map(|i| params.get(i).cloned()).collect();
        self.recorder.record(Event::Execute(bound));
        let count = self.recorder.executions.fetch_add(1, Ordering::SeqCst) + 1;
        if self.recorder.behavior.lock().unwrap().fail_on_execute == Some(count) {
            return Err(simulated_failure("execute"));
        }
        Ok(1)
    }
}

/// Destination handing out recording connections.
#[derive(Debug, Clone)]
pub(crate) struct RecordingDestination {
    pub(crate) recorder: Recorder,
    pub(crate) fail_to_connect: bool,
}

impl RecordingDestination {
    pub(crate) fn new(recorder: Recorder) -> Self {
        Self {
            recorder,
            fail_to_connect: false,
        }
    }
}

impl PartialEq for RecordingDestination {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.recorder.events, &other.recorder.events)
    }
}

impl Destination for RecordingDestination {
    type Connection = RecordingConnection;

    async fn connection(&self) -> SetupResult<RecordingConnection> {
        if self.fail_to_connect {
            return Err(simulated_failure("connect"));
        }
        Ok(self.recorder.connection())
    }
}
