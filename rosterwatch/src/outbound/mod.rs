//! Outbound adapters implementing the domain ports.

pub mod hipchat;
pub mod snapshot;
