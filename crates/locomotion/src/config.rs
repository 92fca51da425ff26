use glam::Vec3;
use serde::{Deserialize, Serialize};
use thirdperson_common::error::{ensure_finite, ensure_positive};
use thirdperson_common::{InvalidParam, LayerMask};

/// Locomotion tunables. Fixed for the lifetime of a body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Units per second without sprint.
    pub walk_speed: f32,
    /// Units per second while sprint is held.
    pub run_speed: f32,
    /// Vertical acceleration; negative pulls down.
    pub gravity: f32,
    /// Apex height of a jump from rest.
    pub jump_height: f32,
    pub ground_probe_radius: f32,
    /// Probe centre relative to the body, in body space.
    pub ground_probe_offset: Vec3,
    pub ground_mask: LayerMask,
    /// Vertical velocity held while grounded so contact keeps registering.
    pub ground_stick_velocity: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            walk_speed: 5.0,
            run_speed: 8.0,
            gravity: -9.81,
            jump_height: 1.5,
            ground_probe_radius: 0.4,
            ground_probe_offset: Vec3::new(0.0, -1.0, 0.0),
            ground_mask: LayerMask::ALL,
            ground_stick_velocity: -2.0,
        }
    }
}

impl LocomotionConfig {
    pub fn validate(&self) -> Result<(), InvalidParam> {
        ensure_positive("walk_speed", self.walk_speed)?;
        ensure_positive("run_speed", self.run_speed)?;
        ensure_finite("gravity", self.gravity)?;
        if self.gravity >= 0.0 {
            return Err(InvalidParam::new("gravity", "must be negative"));
        }
        ensure_finite("jump_height", self.jump_height)?;
        if self.jump_height < 0.0 {
            return Err(InvalidParam::new("jump_height", "must not be negative"));
        }
        ensure_positive("ground_probe_radius", self.ground_probe_radius)?;
        if !self.ground_probe_offset.is_finite() {
            return Err(InvalidParam::new("ground_probe_offset", "must be finite"));
        }
        ensure_finite("ground_stick_velocity", self.ground_stick_velocity)?;
        if self.ground_stick_velocity > 0.0 {
            return Err(InvalidParam::new(
                "ground_stick_velocity",
                "must not point upward",
            ));
        }
        Ok(())
    }
}
