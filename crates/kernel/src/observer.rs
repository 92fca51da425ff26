use glam::Vec3;
use serde::{Deserialize, Serialize};
use thirdperson_common::EntityId;

/// Frame phase a callback ran in. All update work finishes before late work starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Locomotion: moves bodies.
    Update,
    /// Camera: reads moved bodies, steers their yaw.
    Late,
}

/// Why a tick produced no effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// An input action the component reads is not bound.
    MissingInput,
    /// The component's own entity has no transform in the host.
    MissingBody,
    /// A camera has no follow target, or the target is gone.
    MissingTarget,
    /// Frame delta was negative or not finite.
    InvalidDelta,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MissingInput => "input action not bound",
            Self::MissingBody => "body transform missing",
            Self::MissingTarget => "follow target missing",
            Self::InvalidDelta => "invalid frame delta",
        };
        f.write_str(s)
    }
}

/// Optional hook for debug visualization and diagnostics.
///
/// Controllers call into it but never depend on what it does.
pub trait FrameObserver {
    fn on_ground_probe(
        &mut self,
        _entity: EntityId,
        _center: Vec3,
        _radius: f32,
        _grounded: bool,
    ) {
    }

    fn on_jump(&mut self, _entity: EntityId, _velocity: f32) {}

    /// Jump pressed while airborne; the request is dropped.
    fn on_jump_rejected(&mut self, _entity: EntityId) {}

    fn on_camera_resolved(
        &mut self,
        _target: EntityId,
        _ideal: Vec3,
        _resolved: Vec3,
        _clamped: bool,
    ) {
    }

    fn on_skip(&mut self, _phase: Phase, _entity: Option<EntityId>, _reason: SkipReason) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl FrameObserver for NoopObserver {}
