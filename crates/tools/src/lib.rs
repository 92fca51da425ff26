//! Developer tooling: rig inspector and debug gizmos.
//!
//! # Invariants
//! - Tools only read controller state; they never drive a tick themselves.

pub mod gizmo;
pub mod inspector;

pub use gizmo::{Color, Gizmo, GizmoRecorder};
pub use inspector::{CameraInfo, PlayerInfo, RigInspector, RigSummary};
