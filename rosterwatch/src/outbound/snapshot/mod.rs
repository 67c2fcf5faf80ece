//! File-backed roster snapshot persistence.

mod atomic_io;
mod json_file_store;

pub use json_file_store::JsonFileSnapshotStore;
