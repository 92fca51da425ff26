//! Critically-damped smoothing and angle helpers.
//!
//! The damped approach is the closed-form critically damped spring with a
//! polynomial approximation of `exp(-omega * dt)`. Velocities are owned by the
//! caller so the update stays a pure function of (value, target, velocity, dt).

use glam::{EulerRot, Quat, Vec3};

/// Smallest accepted smoothing time constant.
const MIN_SMOOTH_TIME: f32 = 1e-4;

/// Wrap `t` into `[0, length)`.
pub fn repeat(t: f32, length: f32) -> f32 {
    (t - (t / length).floor() * length).clamp(0.0, length)
}

/// Shortest signed difference from `current` to `target` in degrees, in `(-180, 180]`.
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let mut delta = repeat(target - current, 360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}

fn damping_factors(smooth_time: f32, dt: f32) -> (f32, f32) {
    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    (omega, exp)
}

/// Move `current` toward `target` without overshoot.
///
/// A non-positive `dt` leaves both value and velocity untouched.
pub fn smooth_damp(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    dt: f32,
) -> f32 {
    if dt <= 0.0 {
        return current;
    }
    let (omega, exp) = damping_factors(smooth_time, dt);
    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    // Clamp if we went past the target.
    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = 0.0;
    }
    output
}

/// Angular variant of [`smooth_damp`] that takes the short way across 0/360.
pub fn smooth_damp_angle(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    dt: f32,
) -> f32 {
    let target = current + delta_angle(current, target);
    smooth_damp(current, target, velocity, smooth_time, dt)
}

/// Vector variant of [`smooth_damp`]; the overshoot test is done along the
/// approach direction so all components settle together.
pub fn smooth_damp_vec3(
    current: Vec3,
    target: Vec3,
    velocity: &mut Vec3,
    smooth_time: f32,
    dt: f32,
) -> Vec3 {
    if dt <= 0.0 {
        return current;
    }
    let (omega, exp) = damping_factors(smooth_time, dt);
    let change = current - target;
    let temp = (*velocity + change * omega) * dt;
    *velocity = (*velocity - temp * omega) * exp;
    let mut output = target + (change + temp) * exp;

    if (target - current).dot(output - target) > 0.0 {
        output = target;
        *velocity = Vec3::ZERO;
    }
    output
}

/// Rotation for an orbit at `pitch` (down is positive) and `yaw`, both in degrees.
pub fn orbit_rotation(pitch_degrees: f32, yaw_degrees: f32) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        yaw_degrees.to_radians(),
        pitch_degrees.to_radians(),
        0.0,
    )
}

/// Rotation whose local forward (+Z) points along `direction`, with no roll.
///
/// Returns `None` for a zero-length direction.
pub fn look_rotation(direction: Vec3) -> Option<Quat> {
    let dir = direction.try_normalize()?;
    let yaw = dir.x.atan2(dir.z);
    let pitch = -dir.y.clamp(-1.0, 1.0).asin();
    Some(Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0))
}
