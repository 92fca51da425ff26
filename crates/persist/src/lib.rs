//! Persistence: controller state snapshots with integrity checking.
//!
//! # Invariants
//! - Snapshots carry a SHA-256 of their CBOR payload and fail closed on mismatch.
//! - Restoring a snapshot and resuming frames reproduces the uninterrupted
//!   trajectory exactly, given the same host geometry and inputs.

pub mod snapshot;
pub mod state;

pub use snapshot::{SNAPSHOT_SCHEMA_VERSION, Snapshot, SnapshotError};
pub use state::ControllerState;
