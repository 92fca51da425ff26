//! Shared types and math for the third-person controller.
//!
//! # Invariants
//! - Y is up; an entity's local +Z is forward and local +X is right.
//! - Angles carried in controller state are degrees.

pub mod error;
pub mod math;
pub mod types;

pub use error::InvalidParam;
pub use types::{EntityId, LayerMask, Transform};
