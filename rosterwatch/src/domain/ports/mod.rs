//! Domain ports for the chat service and snapshot storage.

mod macros;
pub(crate) use macros::define_port_error;

mod direct_messenger;
mod roster_source;
mod snapshot_store;

#[cfg(test)]
pub use direct_messenger::MockDirectMessenger;
pub use direct_messenger::{
    DirectMessageError, DirectMessenger, FixtureDirectMessenger, RecipientId,
};
#[cfg(test)]
pub use roster_source::MockRosterSource;
pub use roster_source::{FixtureRosterSource, PageRequest, RosterSource, RosterSourceError};
#[cfg(test)]
pub use snapshot_store::MockSnapshotStore;
pub use snapshot_store::{FixtureSnapshotStore, SnapshotLoad, SnapshotStore, SnapshotStoreError};
