//! Roster presence watcher.
//!
//! A single run fetches the chat service's user directory, compares it with
//! the snapshot saved by the previous run, direct-messages every configured
//! recipient about users who arrived or departed, and saves the new snapshot.
//!
//! - [`domain`] holds the roster model, the reconciliation rules, and the
//!   watch cycle that sequences them behind ports.
//! - [`outbound`] supplies the HTTP and file adapters for those ports.
//! - [`config`] loads the JSON configuration file.

pub mod config;
pub mod domain;
pub mod outbound;

mod file_path;
