//! The mutable working set around the engine and its persisted snapshot.

pub mod config;
pub mod snapshot;
pub mod state;
