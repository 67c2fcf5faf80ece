//! One fetch, reconcile, notify, persist cycle.
//!
//! The cycle announces changes before it persists the new snapshot. A save
//! failure therefore leaves the old snapshot in place and the same changes
//! are announced again on the next run.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::notifier::{DeliveryReport, Notifier};
use super::ports::{
    DirectMessenger, RecipientId, RosterSource, RosterSourceError, SnapshotLoad, SnapshotStore,
    SnapshotStoreError,
};
use super::reconciler::diff;
use super::roster_client::{DEFAULT_PAGE_SIZE, RosterClient};
use super::Roster;

/// Progress of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// Nothing has happened yet.
    Init,
    /// The current roster was fetched.
    Fetched,
    /// The roster was compared against the previous snapshot.
    Reconciled,
    /// Every announcement was dispatched.
    Notified,
    /// The new snapshot was written.
    Persisted,
    /// Fetching the roster failed; nothing was announced or written.
    FailedFetch,
    /// Writing the snapshot failed after announcements were sent.
    FailedPersist,
}

impl CycleState {
    /// Return whether the cycle stops in this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Persisted | Self::FailedFetch | Self::FailedPersist
        )
    }
}

/// Fatal cycle failures, tagged by phase.
#[derive(Debug, Error)]
pub enum CycleError {
    /// The roster could not be fetched.
    #[error("roster fetch failed: {source}")]
    Fetch {
        /// Underlying source error.
        #[source]
        source: RosterSourceError,
    },
    /// The snapshot could not be written.
    #[error("snapshot persistence failed after notifications were sent: {source}")]
    Persist {
        /// Underlying store error.
        #[source]
        source: SnapshotStoreError,
    },
}

impl CycleError {
    /// Terminal state the cycle stopped in.
    #[must_use]
    pub const fn state(&self) -> CycleState {
        match self {
            Self::Fetch { .. } => CycleState::FailedFetch,
            Self::Persist { .. } => CycleState::FailedPersist,
        }
    }
}

/// Summary of a completed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Users in the fetched roster.
    pub roster_size: usize,
    /// Users announced as departed.
    pub departed: usize,
    /// Users announced as arrived.
    pub arrived: usize,
    /// Delivery outcomes across every announcement.
    pub deliveries: DeliveryReport,
    /// Whether the previous snapshot was missing or unreadable.
    pub snapshot_reset: bool,
    /// Terminal state reached.
    pub state: CycleState,
}

/// Port bundle required by a watch cycle.
pub struct WatchCyclePorts {
    /// Directory listing adapter.
    pub roster_source: Arc<dyn RosterSource>,
    /// Private message adapter.
    pub messenger: Arc<dyn DirectMessenger>,
    /// Snapshot persistence adapter.
    pub snapshot_store: Arc<dyn SnapshotStore>,
}

impl WatchCyclePorts {
    /// Build a port bundle.
    #[must_use]
    pub const fn new(
        roster_source: Arc<dyn RosterSource>,
        messenger: Arc<dyn DirectMessenger>,
        snapshot_store: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            roster_source,
            messenger,
            snapshot_store,
        }
    }
}

/// Sequences the roster client, reconciler, notifier, and snapshot store.
pub struct WatchCycle {
    client: RosterClient,
    notifier: Notifier,
    snapshot_store: Arc<dyn SnapshotStore>,
}

impl WatchCycle {
    /// Build a cycle using the default page size.
    #[must_use]
    pub fn new(ports: WatchCyclePorts, recipients: Vec<RecipientId>) -> Self {
        Self::with_page_size(ports, recipients, DEFAULT_PAGE_SIZE)
    }

    /// Build a cycle with an explicit roster page size.
    #[must_use]
    pub fn with_page_size(
        ports: WatchCyclePorts,
        recipients: Vec<RecipientId>,
        page_size: usize,
    ) -> Self {
        Self {
            client: RosterClient::with_page_size(ports.roster_source, page_size),
            notifier: Notifier::new(ports.messenger, recipients),
            snapshot_store: ports.snapshot_store,
        }
    }

    /// Run the cycle once.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::Fetch`] before any side effect when the roster
    /// cannot be fetched, and [`CycleError::Persist`] when the snapshot cannot
    /// be written. Delivery failures are logged and never returned.
    pub async fn run(&self) -> Result<CycleReport, CycleError> {
        let mut state = CycleState::Init;

        let current = match self.client.fetch_all().await {
            Ok(roster) => roster,
            Err(source) => {
                advance(&mut state, CycleState::FailedFetch);
                return Err(CycleError::Fetch { source });
            }
        };
        advance(&mut state, CycleState::Fetched);

        let (previous, snapshot_reset) = self.load_previous().await;
        if current.is_empty() && !previous.is_empty() {
            warn!(
                previous = previous.len(),
                "directory returned no users; every known user will be announced as departed"
            );
        }

        let changes = diff(&previous, &current);
        let departed = changes.departed().len();
        let arrived = changes.arrived().len();
        advance(&mut state, CycleState::Reconciled);
        if changes.is_empty() {
            debug!("roster unchanged");
        } else {
            debug!(
                changes = changes.len(),
                recipients = self.notifier.recipients().len(),
                "announcing roster changes"
            );
        }

        let mut deliveries = DeliveryReport::default();
        for event in changes.into_events() {
            debug!(user = %event.user().id(), "announcing change");
            deliveries += self.notifier.notify(&event.message()).await;
        }
        advance(&mut state, CycleState::Notified);

        if let Err(source) = self.snapshot_store.save_snapshot(&current).await {
            advance(&mut state, CycleState::FailedPersist);
            return Err(CycleError::Persist { source });
        }
        advance(&mut state, CycleState::Persisted);

        info!(
            roster_size = current.len(),
            departed,
            arrived,
            delivered = deliveries.delivered,
            failed_deliveries = deliveries.failed,
            snapshot_reset,
            "watch cycle complete"
        );

        Ok(CycleReport {
            roster_size: current.len(),
            departed,
            arrived,
            deliveries,
            snapshot_reset,
            state,
        })
    }

    async fn load_previous(&self) -> (Roster, bool) {
        match self.snapshot_store.read_snapshot().await {
            SnapshotLoad::Loaded(roster) => (roster, false),
            SnapshotLoad::Missing => {
                warn!("no previous state: resetting");
                (Roster::new(), true)
            }
            SnapshotLoad::Invalid { reason } => {
                warn!(%reason, "invalid state: resetting");
                (Roster::new(), true)
            }
        }
    }
}

fn advance(state: &mut CycleState, next: CycleState) {
    debug!(from = ?*state, to = ?next, "watch cycle transition");
    *state = next;
}

#[cfg(test)]
mod tests;
