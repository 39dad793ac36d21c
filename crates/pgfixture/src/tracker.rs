//! Skipping setups that would not change anything.

use crate::destination::Destination;
use crate::error::SetupResult;
use crate::setup::DbSetup;

/// Remembers the last launched setup so read-only tests can skip relaunching it.
///
/// A test that does not modify the database calls [`skip_next_launch`]; the next
/// [`launch_if_necessary`] then does nothing if it is given the same setup again.
///
/// ```ignore
/// let mut tracker = DbSetupTracker::new();
///
/// // in each test
/// tracker.launch_if_necessary(fixture()).await?;
/// // ... read-only assertions ...
/// tracker.skip_next_launch();
/// ```
///
/// [`skip_next_launch`]: DbSetupTracker::skip_next_launch
/// [`launch_if_necessary`]: DbSetupTracker::launch_if_necessary
#[derive(Debug)]
pub struct DbSetupTracker<D> {
    last_setup: Option<DbSetup<D>>,
    next_launch_skipped: bool,
}

impl<D> DbSetupTracker<D> {
    pub fn new() -> Self {
        Self {
            last_setup: None,
            next_launch_skipped: false,
        }
    }

    /// Skip the next launch if it is the same setup as the last one.
    pub fn skip_next_launch(&mut self) {
        self.next_launch_skipped = true;
    }

    /// The last setup launched successfully.
    pub fn last_setup(&self) -> Option<&DbSetup<D>> {
        self.last_setup.as_ref()
    }
}

impl<D: Destination + PartialEq> DbSetupTracker<D> {
    /// Launch `setup` unless the launch was skipped and `setup` equals the last
    /// launched one. The skip request is consumed either way.
    pub async fn launch_if_necessary(&mut self, setup: DbSetup<D>) -> SetupResult<()> {
        let skip = self.next_launch_skipped && self.last_setup.as_ref() == Some(&setup);
        self.next_launch_skipped = false;
        if skip {
            tracing::debug!(target: "pgfixture.setup", "setup unchanged, launch skipped");
            return Ok(());
        }
        setup.launch().await?;
        self.last_setup = Some(setup);
        Ok(())
    }
}

impl<D> Default for DbSetupTracker<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::*;
    use crate::testing::{Event, Recorder, RecordingDestination};

    fn launches(recorder: &Recorder) -> usize {
        recorder
            .events()
            .iter()
            .filter(|event| **event == Event::Begin)
            .count()
    }

    #[tokio::test]
    async fn launches_unless_skipped() {
        let recorder = Recorder::new();
        let destination = RecordingDestination::new(recorder.clone());
        let setup = || DbSetup::new(destination.clone(), truncate("a"));
        let mut tracker = DbSetupTracker::new();

        tracker.launch_if_necessary(setup()).await.unwrap();
        tracker.launch_if_necessary(setup()).await.unwrap();
        assert_eq!(launches(&recorder), 2);

        tracker.skip_next_launch();
        tracker.launch_if_necessary(setup()).await.unwrap();
        assert_eq!(launches(&recorder), 2);

        // the skip applies to one launch only
        tracker.launch_if_necessary(setup()).await.unwrap();
        assert_eq!(launches(&recorder), 3);
    }

    #[tokio::test]
    async fn different_setup_is_launched_even_when_skipped() {
        let recorder = Recorder::new();
        let destination = RecordingDestination::new(recorder.clone());
        let mut tracker = DbSetupTracker::new();

        tracker
            .launch_if_necessary(DbSetup::new(destination.clone(), truncate("a")))
            .await
            .unwrap();
        tracker.skip_next_launch();
        tracker
            .launch_if_necessary(DbSetup::new(destination.clone(), truncate("b")))
            .await
            .unwrap();

        assert_eq!(launches(&recorder), 2);
        assert_eq!(
            tracker.last_setup().map(|setup| setup.operation().to_string()),
            Some("truncate table b".to_string())
        );
    }

    #[tokio::test]
    async fn skip_before_any_launch_does_nothing() {
        let recorder = Recorder::new();
        let mut tracker = DbSetupTracker::new();

        tracker.skip_next_launch();
        tracker
            .launch_if_necessary(DbSetup::new(
                RecordingDestination::new(recorder.clone()),
                truncate("a"),
            ))
            .await
            .unwrap();
        assert_eq!(launches(&recorder), 1);
    }

    #[tokio::test]
    async fn failed_launch_is_not_remembered() {
        let recorder = Recorder::new().fail_on_batch("truncate table a");
        let destination = RecordingDestination::new(recorder.clone());
        let mut tracker = DbSetupTracker::new();

        let result = tracker
            .launch_if_necessary(DbSetup::new(destination.clone(), truncate("a")))
            .await;
        assert!(result.is_err());
        assert!(tracker.last_setup().is_none());

        tracker.skip_next_launch();
        let result = tracker
            .launch_if_necessary(DbSetup::new(destination, truncate("a")))
            .await;
        assert!(result.is_err());
        assert_eq!(launches(&recorder), 2);
    }
}
