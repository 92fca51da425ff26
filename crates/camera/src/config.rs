use serde::{Deserialize, Serialize};
use thirdperson_common::error::{ensure_finite, ensure_positive};
use thirdperson_common::{InvalidParam, LayerMask};

/// Follow camera tunables. Angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Degrees per second per unit of look input.
    pub sensitivity: f32,
    pub invert_y: bool,
    pub min_pitch: f32,
    pub max_pitch: f32,

    /// Orbit radius around the look-at point.
    pub distance: f32,
    /// Look-at point height above the target origin.
    pub height: f32,
    /// Closest the collision clamp may pull the camera in.
    pub min_distance: f32,
    pub max_distance: f32,

    pub rotation_smooth_time: f32,
    pub position_smooth_time: f32,

    pub collision_enabled: bool,
    pub collision_mask: LayerMask,
    pub collision_radius: f32,

    /// Also clamp the smoothed pitch, not just the target.
    pub clamp_smoothed_pitch: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            sensitivity: 100.0,
            invert_y: false,
            min_pitch: -40.0,
            max_pitch: 80.0,
            distance: 5.0,
            height: 2.0,
            min_distance: 1.0,
            max_distance: 10.0,
            rotation_smooth_time: 0.12,
            position_smooth_time: 0.12,
            collision_enabled: true,
            collision_mask: LayerMask::ALL,
            collision_radius: 0.3,
            clamp_smoothed_pitch: false,
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<(), InvalidParam> {
        ensure_finite("sensitivity", self.sensitivity)?;
        ensure_finite("min_pitch", self.min_pitch)?;
        ensure_finite("max_pitch", self.max_pitch)?;
        if self.min_pitch > self.max_pitch {
            return Err(InvalidParam::new(
                "min_pitch",
                format!("{} exceeds max_pitch {}", self.min_pitch, self.max_pitch),
            ));
        }
        if self.min_pitch < -90.0 || self.max_pitch > 90.0 {
            return Err(InvalidParam::new(
                "max_pitch",
                "pitch range must stay within ±90",
            ));
        }
        ensure_positive("distance", self.distance)?;
        ensure_finite("height", self.height)?;
        ensure_finite("min_distance", self.min_distance)?;
        ensure_finite("max_distance", self.max_distance)?;
        if self.min_distance < 0.0 || self.min_distance > self.max_distance {
            return Err(InvalidParam::new(
                "min_distance",
                "must be in [0, max_distance]",
            ));
        }
        if self.distance < self.min_distance || self.distance > self.max_distance {
            return Err(InvalidParam::new(
                "distance",
                "must be in [min_distance, max_distance]",
            ));
        }
        ensure_positive("rotation_smooth_time", self.rotation_smooth_time)?;
        ensure_positive("position_smooth_time", self.position_smooth_time)?;
        ensure_finite("collision_radius", self.collision_radius)?;
        if self.collision_radius < 0.0 {
            return Err(InvalidParam::new(
                "collision_radius",
                "must not be negative",
            ));
        }
        Ok(())
    }
}
