//! Roster reconciliation domain.
//!
//! Everything here talks to the outside world through [`ports`]; adapters in
//! `crate::outbound` supply the production implementations.

pub mod ports;

mod notifier;
mod reconciler;
mod roster;
mod roster_client;
mod user;
mod watch_cycle;

pub use notifier::{DeliveryReport, Notifier};
pub use reconciler::{ChangeEvent, RosterChanges, diff};
pub use roster::Roster;
pub use roster_client::{DEFAULT_PAGE_SIZE, RosterClient};
pub use user::{User, UserId};
pub use watch_cycle::{CycleError, CycleReport, CycleState, WatchCycle, WatchCyclePorts};
