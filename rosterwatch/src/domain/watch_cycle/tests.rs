//! Unit tests for watch cycle orchestration.

use std::sync::Mutex;

use async_trait::async_trait;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    DirectMessageError, FixtureDirectMessenger, FixtureRosterSource, FixtureSnapshotStore,
    MockRosterSource, MockSnapshotStore,
};
use crate::domain::{User, UserId};

#[derive(Default)]
struct RecordingMessenger {
    sent: Mutex<Vec<(RecipientId, String)>>,
}

impl RecordingMessenger {
    fn messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .expect("sent mutex")
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }
}

#[async_trait]
impl DirectMessenger for RecordingMessenger {
    async fn send_message(
        &self,
        recipient: &RecipientId,
        message: &str,
    ) -> Result<(), DirectMessageError> {
        self.sent
            .lock()
            .expect("sent mutex")
            .push((recipient.clone(), message.to_owned()));
        Ok(())
    }
}

fn alice() -> User {
    User::new(UserId::new(1), "alice", "Alice A")
}

fn bob() -> User {
    User::new(UserId::new(2), "bob", "Bob B")
}

fn roster(users: &[User]) -> Roster {
    users.iter().cloned().collect()
}

#[fixture]
fn messenger() -> Arc<RecordingMessenger> {
    Arc::new(RecordingMessenger::default())
}

fn cycle(
    current: Vec<User>,
    messenger: &Arc<RecordingMessenger>,
    store: &Arc<FixtureSnapshotStore>,
) -> WatchCycle {
    WatchCycle::new(
        WatchCyclePorts::new(
            Arc::new(FixtureRosterSource::new(current)),
            messenger.clone(),
            store.clone(),
        ),
        vec![RecipientId::new("ops")],
    )
}

#[rstest]
#[tokio::test]
async fn announces_new_arrival_and_persists_current_roster(messenger: Arc<RecordingMessenger>) {
    let store = Arc::new(FixtureSnapshotStore::with_roster(roster(&[alice()])));
    let cycle = cycle(vec![alice(), bob()], &messenger, &store);

    let report = cycle.run().await.expect("cycle succeeds");

    assert_eq!(messenger.messages(), vec!["Say hello to @bob (Bob B)"]);
    assert_eq!(store.saved(), Some(roster(&[alice(), bob()])));
    assert_eq!(report.arrived, 1);
    assert_eq!(report.departed, 0);
    assert_eq!(report.state, CycleState::Persisted);
    assert!(!report.snapshot_reset);
}

#[rstest]
#[tokio::test]
async fn announces_departure_and_persists_remaining_users(messenger: Arc<RecordingMessenger>) {
    let store = Arc::new(FixtureSnapshotStore::with_roster(roster(&[alice(), bob()])));
    let cycle = cycle(vec![bob()], &messenger, &store);

    let report = cycle.run().await.expect("cycle succeeds");

    assert_eq!(messenger.messages(), vec!["Goodbye to @alice (Alice A)"]);
    assert_eq!(store.saved(), Some(roster(&[bob()])));
    assert_eq!(report.departed, 1);
    assert_eq!(report.deliveries.delivered, 1);
}

#[rstest]
#[tokio::test]
async fn missing_snapshot_announces_everyone(messenger: Arc<RecordingMessenger>) {
    let store = Arc::new(FixtureSnapshotStore::default());
    let cycle = cycle(vec![alice(), bob()], &messenger, &store);

    let report = cycle.run().await.expect("cycle succeeds");

    let mut messages = messenger.messages();
    messages.sort();
    assert_eq!(
        messages,
        vec![
            "Say hello to @alice (Alice A)".to_owned(),
            "Say hello to @bob (Bob B)".to_owned(),
        ]
    );
    assert!(report.snapshot_reset);
    assert_eq!(store.saved(), Some(roster(&[alice(), bob()])));
}

#[rstest]
#[tokio::test]
async fn invalid_snapshot_is_treated_as_empty(messenger: Arc<RecordingMessenger>) {
    let mut store = MockSnapshotStore::new();
    store.expect_read_snapshot().times(1).returning(|| SnapshotLoad::Invalid {
        reason: "expected value at line 1 column 1".to_owned(),
    });
    store
        .expect_save_snapshot()
        .withf(|saved| saved.len() == 1)
        .times(1)
        .returning(|_| Ok(()));
    let cycle = WatchCycle::new(
        WatchCyclePorts::new(
            Arc::new(FixtureRosterSource::new(vec![bob()])),
            messenger.clone(),
            Arc::new(store),
        ),
        vec![RecipientId::new("ops")],
    );

    let report = cycle.run().await.expect("cycle succeeds");

    assert!(report.snapshot_reset);
    assert_eq!(messenger.messages(), vec!["Say hello to @bob (Bob B)"]);
}

#[rstest]
#[tokio::test]
async fn unchanged_roster_sends_nothing(messenger: Arc<RecordingMessenger>) {
    let store = Arc::new(FixtureSnapshotStore::with_roster(roster(&[alice(), bob()])));
    let cycle = cycle(vec![bob(), alice()], &messenger, &store);

    let report = cycle.run().await.expect("cycle succeeds");

    assert!(messenger.messages().is_empty());
    assert_eq!(report.deliveries, DeliveryReport::default());
    assert_eq!(store.saved(), Some(roster(&[alice(), bob()])));
}

#[rstest]
#[tokio::test]
async fn empty_directory_announces_everyone_departed(messenger: Arc<RecordingMessenger>) {
    let store = Arc::new(FixtureSnapshotStore::with_roster(roster(&[alice(), bob()])));
    let cycle = cycle(Vec::new(), &messenger, &store);

    let report = cycle.run().await.expect("cycle succeeds");

    let mut messages = messenger.messages();
    messages.sort();
    assert_eq!(
        messages,
        vec![
            "Goodbye to @alice (Alice A)".to_owned(),
            "Goodbye to @bob (Bob B)".to_owned(),
        ]
    );
    assert_eq!(report.departed, 2);
    assert_eq!(report.arrived, 0);
    assert_eq!(report.roster_size, 0);
    assert_eq!(store.saved(), Some(Roster::new()));
}

#[tokio::test]
async fn small_pages_still_persist_the_whole_directory() {
    let store = Arc::new(FixtureSnapshotStore::with_roster(roster(&[alice()])));
    let carol = User::new(UserId::new(3), "carol", "Carol C");
    let cycle = WatchCycle::with_page_size(
        WatchCyclePorts::new(
            Arc::new(FixtureRosterSource::new(vec![alice(), bob(), carol.clone()])),
            Arc::new(FixtureDirectMessenger),
            store.clone(),
        ),
        vec![RecipientId::new("ops"), RecipientId::new("oncall")],
        2,
    );

    let report = cycle.run().await.expect("cycle succeeds");

    assert_eq!(report.roster_size, 3);
    assert_eq!(report.arrived, 2);
    assert_eq!(report.deliveries.delivered, 4);
    assert_eq!(store.saved(), Some(roster(&[alice(), bob(), carol])));
}

#[rstest]
#[tokio::test]
async fn fetch_failure_has_no_side_effects(messenger: Arc<RecordingMessenger>) {
    let mut source = MockRosterSource::new();
    source
        .expect_fetch_page()
        .returning(|_| Err(RosterSourceError::unauthorized("status 401")));
    let mut store = MockSnapshotStore::new();
    store.expect_read_snapshot().never();
    store.expect_save_snapshot().never();
    let cycle = WatchCycle::new(
        WatchCyclePorts::new(Arc::new(source), messenger.clone(), Arc::new(store)),
        vec![RecipientId::new("ops")],
    );

    let err = cycle.run().await.expect_err("cycle fails");

    assert_eq!(err.state(), CycleState::FailedFetch);
    assert!(matches!(
        err,
        CycleError::Fetch {
            source: RosterSourceError::Unauthorized { .. }
        }
    ));
    assert!(messenger.messages().is_empty());
}

#[rstest]
#[tokio::test]
async fn persist_failure_happens_after_notifications(messenger: Arc<RecordingMessenger>) {
    let mut store = MockSnapshotStore::new();
    store
        .expect_read_snapshot()
        .returning(|| SnapshotLoad::Loaded(Roster::new()));
    store
        .expect_save_snapshot()
        .times(1)
        .returning(|_| Err(SnapshotStoreError::write("state.json", "read-only filesystem")));
    let cycle = WatchCycle::new(
        WatchCyclePorts::new(
            Arc::new(FixtureRosterSource::new(vec![alice()])),
            messenger.clone(),
            Arc::new(store),
        ),
        vec![RecipientId::new("ops")],
    );

    let err = cycle.run().await.expect_err("cycle fails");

    assert_eq!(err.state(), CycleState::FailedPersist);
    assert_eq!(messenger.messages(), vec!["Say hello to @alice (Alice A)"]);
}

#[rstest]
#[case(CycleState::Init, false)]
#[case(CycleState::Fetched, false)]
#[case(CycleState::Reconciled, false)]
#[case(CycleState::Notified, false)]
#[case(CycleState::Persisted, true)]
#[case(CycleState::FailedFetch, true)]
#[case(CycleState::FailedPersist, true)]
fn terminal_states(#[case] state: CycleState, #[case] terminal: bool) {
    assert_eq!(state.is_terminal(), terminal);
}
