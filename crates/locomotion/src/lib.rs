//! Locomotion: converts move/jump/sprint input into body displacement.
//!
//! # Invariants
//! - A tick that starts grounded with downward velocity resets it to the
//!   ground-stick floor before gravity is applied.
//! - Jump fires only on a rising edge while grounded; airborne requests are dropped.
//! - Horizontal and vertical displacement are applied as two separate moves.

pub mod config;
pub mod controller;

pub use config::LocomotionConfig;
pub use controller::{
    JumpOutcome, Locomotion, LocomotionEffects, LocomotionState, MoveAxes, TickOutcome,
    jump_velocity, step,
};
