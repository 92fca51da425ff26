use glam::Vec3;
use serde::{Deserialize, Serialize};
use thirdperson_common::{EntityId, Transform};
use thirdperson_input::LocomotionInput;
use thirdperson_kernel::{FrameObserver, Host, Phase, SkipReason};

use crate::config::LocomotionConfig;

/// Per-body locomotion state carried between ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LocomotionState {
    /// Signed vertical speed; negative is falling.
    pub vertical_velocity: f32,
    /// Result of the most recent ground probe.
    pub is_grounded: bool,
}

/// Body-space axes used to turn the 2D move input into a world direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveAxes {
    pub right: Vec3,
    pub forward: Vec3,
}

impl From<&Transform> for MoveAxes {
    fn from(t: &Transform) -> Self {
        Self {
            right: t.right(),
            forward: t.forward(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JumpOutcome {
    NotRequested,
    /// Launched with this vertical velocity.
    Jumped(f32),
    /// Pressed while airborne; dropped.
    Rejected,
}

/// Displacements one tick asks the mover to apply, in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionEffects {
    pub horizontal: Vec3,
    pub vertical: Vec3,
    pub jump: JumpOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Applied(LocomotionEffects),
    Skipped(SkipReason),
}

/// Launch speed that reaches `jump_height` under constant `gravity` (negative).
pub fn jump_velocity(jump_height: f32, gravity: f32) -> f32 {
    (jump_height * -2.0 * gravity).sqrt()
}

/// One locomotion transition. Pure apart from `state`.
pub fn step(
    config: &LocomotionConfig,
    state: &mut LocomotionState,
    input: &LocomotionInput,
    grounded: bool,
    axes: MoveAxes,
    dt: f32,
) -> LocomotionEffects {
    state.is_grounded = grounded;
    if grounded && state.vertical_velocity < 0.0 {
        state.vertical_velocity = config.ground_stick_velocity;
    }

    let direction = axes.right * input.move_axis.x + axes.forward * input.move_axis.y;
    let speed = if input.sprint_held {
        config.run_speed
    } else {
        config.walk_speed
    };
    let horizontal = direction * speed * dt;

    let jump = match (input.jump_pressed, grounded) {
        (true, true) => {
            state.vertical_velocity = jump_velocity(config.jump_height, config.gravity);
            JumpOutcome::Jumped(state.vertical_velocity)
        }
        (true, false) => JumpOutcome::Rejected,
        (false, _) => JumpOutcome::NotRequested,
    };

    state.vertical_velocity += config.gravity * dt;
    let vertical = Vec3::new(0.0, state.vertical_velocity, 0.0) * dt;

    LocomotionEffects {
        horizontal,
        vertical,
        jump,
    }
}

/// Locomotion bound to one body in the host.
#[derive(Debug, Clone)]
pub struct Locomotion {
    entity: EntityId,
    config: LocomotionConfig,
    state: LocomotionState,
}

impl Locomotion {
    pub fn new(entity: EntityId, config: LocomotionConfig) -> Self {
        Self {
            entity,
            config,
            state: LocomotionState::default(),
        }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    pub fn state(&self) -> &LocomotionState {
        &self.state
    }

    /// Replace state, e.g. when restoring a snapshot.
    pub fn set_state(&mut self, state: LocomotionState) {
        self.state = state;
    }

    /// Probe the ground, run [`step`], and apply both displacements through the host.
    pub fn tick<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        input: Option<&LocomotionInput>,
        dt: f32,
        observer: &mut dyn FrameObserver,
    ) -> TickOutcome {
        let _span = tracing::trace_span!("locomotion_tick", entity = ?self.entity).entered();

        if !dt.is_finite() || dt < 0.0 {
            return self.skip(SkipReason::InvalidDelta, observer);
        }
        let Some(input) = input else {
            return self.skip(SkipReason::MissingInput, observer);
        };
        let Some(body) = host.transform(self.entity) else {
            return self.skip(SkipReason::MissingBody, observer);
        };

        let probe = body.transform_offset(self.config.ground_probe_offset);
        let radius = self.config.ground_probe_radius;
        let grounded = host.check_sphere(probe, radius, self.config.ground_mask);
        observer.on_ground_probe(self.entity, probe, radius, grounded);

        let effects = step(
            &self.config,
            &mut self.state,
            input,
            grounded,
            MoveAxes::from(&body),
            dt,
        );

        match effects.jump {
            JumpOutcome::Jumped(velocity) => {
                tracing::debug!(entity = ?self.entity, velocity, "jump");
                observer.on_jump(self.entity, velocity);
            }
            JumpOutcome::Rejected => {
                tracing::debug!(entity = ?self.entity, "jump ignored: not grounded");
                observer.on_jump_rejected(self.entity);
            }
            JumpOutcome::NotRequested => {}
        }

        host.move_character(self.entity, effects.horizontal);
        host.move_character(self.entity, effects.vertical);
        TickOutcome::Applied(effects)
    }

    fn skip(&self, reason: SkipReason, observer: &mut dyn FrameObserver) -> TickOutcome {
        tracing::trace!(entity = ?self.entity, %reason, "locomotion tick skipped");
        observer.on_skip(Phase::Update, Some(self.entity), reason);
        TickOutcome::Skipped(reason)
    }
}
