//! Follow camera: orbit from look input, damped smoothing, collision clamp.
//!
//! # Invariants
//! - Target pitch is clamped to `[min_pitch, max_pitch]` every tick.
//! - The camera writes only the followed body's rotation (yaw only), never its position.
//! - Collision never lets the camera end up behind the first surface between
//!   it and the look-at point, except where `min_distance` overrides.

pub mod config;
pub mod follow;

pub use config::CameraConfig;
pub use follow::{
    CameraEffects, CameraState, FollowCamera, Resolved, TickOutcome, ideal_position, look_at_point,
    resolve_collision, step,
};
