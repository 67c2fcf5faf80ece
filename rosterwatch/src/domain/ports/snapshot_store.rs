//! Driven port for the roster snapshot persisted between runs.
//!
//! Reading never fails: adapters report a missing or unreadable snapshot as
//! data so the domain can decide how to recover. Writing is fallible and the
//! caller treats failure as fatal.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::Roster;

/// Outcome of reading the previous snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotLoad {
    /// A snapshot was read and decoded.
    Loaded(Roster),
    /// No snapshot exists yet.
    Missing,
    /// A snapshot exists but could not be read or decoded.
    Invalid {
        /// Human-readable cause.
        reason: String,
    },
}

define_port_error! {
    /// Errors surfaced while writing the snapshot.
    pub enum SnapshotStoreError {
        /// The roster could not be serialised.
        Encode { message: String } =>
            "failed to encode snapshot: {message}",
        /// The snapshot file could not be written.
        Write { path: String, message: String } =>
            "failed to write snapshot at '{path}': {message}",
    }
}

/// Port for loading and replacing the persisted roster snapshot.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read the snapshot written by the previous run.
    async fn read_snapshot(&self) -> SnapshotLoad;

    /// Replace the snapshot with `roster` in full.
    async fn save_snapshot(&self, roster: &Roster) -> Result<(), SnapshotStoreError>;
}

/// In-memory snapshot store for tests and dry wiring.
#[derive(Debug, Default)]
pub struct FixtureSnapshotStore {
    roster: Mutex<Option<Roster>>,
}

impl FixtureSnapshotStore {
    /// Start with a previously saved roster.
    #[must_use]
    pub const fn with_roster(roster: Roster) -> Self {
        Self {
            roster: Mutex::new(Some(roster)),
        }
    }

    /// Return the roster most recently saved, if any.
    #[must_use]
    pub fn saved(&self) -> Option<Roster> {
        self.roster
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SnapshotStore for FixtureSnapshotStore {
    async fn read_snapshot(&self) -> SnapshotLoad {
        self.saved().map_or(SnapshotLoad::Missing, SnapshotLoad::Loaded)
    }

    async fn save_snapshot(&self, roster: &Roster) -> Result<(), SnapshotStoreError> {
        *self.roster.lock().unwrap_or_else(PoisonError::into_inner) = Some(roster.clone());
        Ok(())
    }
}
