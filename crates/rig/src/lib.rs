//! Rig: wires locomotion and follow cameras to host bodies and runs frames.
//!
//! # Invariants
//! - Every locomotion tick of a frame completes before any camera tick starts.
//! - A frame with an invalid delta touches neither controller state nor the host.
//! - Configs are validated before a rig is built from them.

pub mod config;
pub mod rig;

pub use config::{ConfigError, RigConfig};
pub use rig::{FrameReport, Rig};
