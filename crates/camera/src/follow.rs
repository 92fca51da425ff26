use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thirdperson_common::math::{look_rotation, orbit_rotation, smooth_damp_angle, smooth_damp_vec3};
use thirdperson_common::{EntityId, Transform};
use thirdperson_input::PointerCapture;
use thirdperson_kernel::{FrameObserver, Host, Phase, PhysicsQuery, SkipReason};

use crate::config::CameraConfig;

/// Offsets shorter than this skip the collision probe.
const MIN_PROBE_DISTANCE: f32 = 0.1;

/// Orbit and smoothing state. Angles in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    /// Target yaw accumulated from input.
    pub yaw: f32,
    /// Target pitch accumulated from input, always clamped.
    pub pitch: f32,
    pub current_yaw: f32,
    pub current_pitch: f32,
    pub yaw_velocity: f32,
    pub pitch_velocity: f32,
    pub current_position: Vec3,
    pub position_velocity: Vec3,
}

impl CameraState {
    /// Start behind `target`, facing the same way, level pitch.
    pub fn activate(config: &CameraConfig, target: &Transform) -> Self {
        let yaw = target.yaw_degrees();
        let pitch = 0.0;
        Self {
            yaw,
            pitch,
            current_yaw: yaw,
            current_pitch: pitch,
            current_position: ideal_position(config, target.position, pitch, yaw),
            ..Self::default()
        }
    }
}

/// Point the camera orbits and looks at.
pub fn look_at_point(config: &CameraConfig, target_position: Vec3) -> Vec3 {
    target_position + Vec3::Y * config.height
}

/// Unobstructed camera position for the given orbit angles.
pub fn ideal_position(config: &CameraConfig, target_position: Vec3, pitch: f32, yaw: f32) -> Vec3 {
    let offset = orbit_rotation(pitch, yaw) * Vec3::new(0.0, 0.0, -config.distance);
    look_at_point(config, target_position) + offset
}

/// Outcome of the collision probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub position: Vec3,
    /// Whether a surface pulled the camera in.
    pub clamped: bool,
}

/// Pull `ideal` in toward `look_at` if geometry lies between them.
pub fn resolve_collision<P: PhysicsQuery + ?Sized>(
    config: &CameraConfig,
    physics: &P,
    look_at: Vec3,
    ideal: Vec3,
) -> Resolved {
    let offset = ideal - look_at;
    let distance = offset.length();
    if distance < MIN_PROBE_DISTANCE {
        return Resolved {
            position: ideal,
            clamped: false,
        };
    }
    let direction = offset / distance;
    match physics.sphere_cast(
        look_at,
        config.collision_radius,
        direction,
        distance,
        config.collision_mask,
    ) {
        Some(hit) => {
            let safe = (hit - config.collision_radius).max(config.min_distance);
            Resolved {
                position: look_at + direction * safe,
                clamped: true,
            }
        }
        None => Resolved {
            position: ideal,
            clamped: false,
        },
    }
}

/// What one camera tick produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraEffects {
    pub position: Vec3,
    pub rotation: Quat,
    /// Yaw-only facing to write onto the followed body.
    pub body_rotation: Option<Quat>,
    /// Position before the collision clamp.
    pub ideal: Vec3,
    pub resolved: Resolved,
}

/// One camera transition. Pure apart from `state`; `physics` is only queried.
pub fn step<P: PhysicsQuery + ?Sized>(
    config: &CameraConfig,
    state: &mut CameraState,
    look: Vec2,
    dt: f32,
    target: &Transform,
    physics: &P,
) -> CameraEffects {
    let mut delta_pitch = look.y * config.sensitivity * dt;
    if config.invert_y {
        delta_pitch = -delta_pitch;
    }
    state.yaw += look.x * config.sensitivity * dt;
    state.pitch = (state.pitch - delta_pitch).clamp(config.min_pitch, config.max_pitch);

    state.current_yaw = smooth_damp_angle(
        state.current_yaw,
        state.yaw,
        &mut state.yaw_velocity,
        config.rotation_smooth_time,
        dt,
    );
    state.current_pitch = smooth_damp_angle(
        state.current_pitch,
        state.pitch,
        &mut state.pitch_velocity,
        config.rotation_smooth_time,
        dt,
    );
    if config.clamp_smoothed_pitch {
        let pitch = state.current_pitch;
        state.current_pitch = pitch.clamp(config.min_pitch, config.max_pitch);
    }

    let look_at = look_at_point(config, target.position);
    let ideal = ideal_position(
        config,
        target.position,
        state.current_pitch,
        state.current_yaw,
    );
    let resolved = if config.collision_enabled {
        resolve_collision(config, physics, look_at, ideal)
    } else {
        Resolved {
            position: ideal,
            clamped: false,
        }
    };

    state.current_position = smooth_damp_vec3(
        state.current_position,
        resolved.position,
        &mut state.position_velocity,
        config.position_smooth_time,
        dt,
    );

    let rotation = look_rotation(look_at - state.current_position)
        .unwrap_or_else(|| orbit_rotation(state.current_pitch, state.current_yaw));
    let mut flat_forward = rotation * Vec3::Z;
    flat_forward.y = 0.0;
    let body_rotation = (flat_forward.length_squared() > f32::EPSILON)
        .then(|| Quat::from_rotation_y(state.current_yaw.to_radians()));

    CameraEffects {
        position: state.current_position,
        rotation,
        body_rotation,
        ideal,
        resolved,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Applied(CameraEffects),
    Skipped(SkipReason),
}

/// A camera following one body.
///
/// Owns its own transform; the host only sees the yaw it writes to the target.
#[derive(Debug, Clone)]
pub struct FollowCamera {
    target: Option<EntityId>,
    config: CameraConfig,
    state: Option<CameraState>,
    transform: Transform,
    pointer: PointerCapture,
}

impl FollowCamera {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            target: None,
            config,
            state: None,
            transform: Transform::default(),
            pointer: PointerCapture::default(),
        }
    }

    pub fn with_target(mut self, target: EntityId) -> Self {
        self.follow(Some(target));
        self
    }

    /// Change the followed body; state re-activates on the next tick.
    pub fn follow(&mut self, target: Option<EntityId>) {
        self.target = target;
        self.state = None;
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn state(&self) -> Option<&CameraState> {
        self.state.as_ref()
    }

    /// Replace state, e.g. when restoring a snapshot. An active state holds
    /// the pointer the same way activation does.
    pub fn set_state(&mut self, state: Option<CameraState>) {
        match state {
            Some(ref s) => {
                self.transform.position = s.current_position;
                self.pointer.capture();
            }
            None => self.pointer.release(),
        }
        self.state = state;
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn pointer(&self) -> &PointerCapture {
        &self.pointer
    }

    /// Set the orbit radius, clamped to `[min_distance, max_distance]`.
    pub fn set_distance(&mut self, distance: f32) {
        self.config.distance = distance.clamp(self.config.min_distance, self.config.max_distance);
    }

    /// Snap behind the target and capture the pointer. Returns false without a target.
    pub fn activate<H: Host + ?Sized>(&mut self, host: &H) -> bool {
        let Some(target) = self.target.and_then(|id| host.transform(id)) else {
            tracing::error!("follow camera has no target to activate on");
            return false;
        };
        let state = CameraState::activate(&self.config, &target);
        let look_at = look_at_point(&self.config, target.position);
        self.transform.position = state.current_position;
        self.transform.rotation =
            look_rotation(look_at - state.current_position).unwrap_or(target.rotation);
        self.state = Some(state);
        self.pointer.capture();
        tracing::debug!(yaw = state.yaw, "follow camera activated");
        true
    }

    /// Release the pointer on an unlock press.
    pub fn handle_unlock(&mut self, pressed: bool) {
        if pressed {
            self.pointer.release();
        }
    }

    /// Late-phase update: orbit, smooth, clamp, then steer the target's yaw.
    pub fn tick<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        look: Option<Vec2>,
        dt: f32,
        observer: &mut dyn FrameObserver,
    ) -> TickOutcome {
        let _span = tracing::trace_span!("camera_tick", target = ?self.target).entered();

        if !dt.is_finite() || dt < 0.0 {
            return self.skip(SkipReason::InvalidDelta, observer);
        }
        let Some(target_id) = self.target else {
            return self.skip(SkipReason::MissingTarget, observer);
        };
        let Some(target) = host.transform(target_id) else {
            return self.skip(SkipReason::MissingTarget, observer);
        };
        let Some(look) = look else {
            return self.skip(SkipReason::MissingInput, observer);
        };
        if self.state.is_none() && !self.activate(&*host) {
            return self.skip(SkipReason::MissingTarget, observer);
        }
        let Some(state) = self.state.as_mut() else {
            return self.skip(SkipReason::MissingTarget, observer);
        };

        let effects = step(&self.config, state, look, dt, &target, &*host);
        self.transform.position = effects.position;
        self.transform.rotation = effects.rotation;
        if let Some(q) = effects.body_rotation {
            host.set_rotation(target_id, q);
        }
        if effects.resolved.clamped {
            tracing::trace!(resolved = ?effects.resolved.position, "camera pulled in by collision");
        }
        observer.on_camera_resolved(
            target_id,
            effects.ideal,
            effects.resolved.position,
            effects.resolved.clamped,
        );
        TickOutcome::Applied(effects)
    }

    fn skip(&self, reason: SkipReason, observer: &mut dyn FrameObserver) -> TickOutcome {
        tracing::trace!(target = ?self.target, %reason, "camera tick skipped");
        observer.on_skip(Phase::Late, self.target, reason);
        TickOutcome::Skipped(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use thirdperson_common::LayerMask;
    use thirdperson_kernel::{
        CharacterMover, NoopObserver, Scene, Shape, StaticCollider, TransformAccess,
    };

    const DT: f32 = 1.0 / 60.0;

    /// Physics that reports a fixed cast hit and counts casts.
    #[derive(Default)]
    struct FakeWorld {
        hit: Option<f32>,
        casts: Cell<usize>,
        id: Option<EntityId>,
        body: Transform,
    }

    impl PhysicsQuery for FakeWorld {
        fn check_sphere(&self, _: Vec3, _: f32, _: LayerMask) -> bool {
            false
        }

        fn sphere_cast(&self, _: Vec3, _: f32, _: Vec3, max: f32, _: LayerMask) -> Option<f32> {
            self.casts.set(self.casts.get() + 1);
            self.hit.filter(|d| *d <= max)
        }
    }

    impl CharacterMover for FakeWorld {
        fn move_character(&mut self, _: EntityId, displacement: Vec3) -> Option<Vec3> {
            self.body.position += displacement;
            Some(self.body.position)
        }
    }

    impl TransformAccess for FakeWorld {
        fn transform(&self, id: EntityId) -> Option<Transform> {
            (self.id == Some(id)).then_some(self.body)
        }

        fn set_position(&mut self, id: EntityId, position: Vec3) -> bool {
            if self.id != Some(id) {
                return false;
            }
            self.body.position = position;
            true
        }

        fn set_rotation(&mut self, id: EntityId, rotation: Quat) -> bool {
            if self.id != Some(id) {
                return false;
            }
            self.body.rotation = rotation;
            true
        }
    }

    fn world_with_body(body: Transform) -> (FakeWorld, EntityId) {
        let id = EntityId::new();
        let world = FakeWorld {
            id: Some(id),
            body,
            ..Default::default()
        };
        (world, id)
    }

    /// Deterministic pseudo-random look inputs in [-range, range].
    fn look_sequence(n: usize, range: f32) -> Vec<Vec2> {
        let mut s: u32 = 0x1234_5678;
        let mut next = move || {
            s = s.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (s >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0
        };
        (0..n).map(|_| Vec2::new(next(), next()) * range).collect()
    }

    #[test]
    fn activation_starts_behind_target() {
        let cfg = CameraConfig::default();
        let target = Transform::from_position_yaw(Vec3::new(1.0, 0.0, 1.0), 90.0);
        let state = CameraState::activate(&cfg, &target);
        assert!((state.yaw - 90.0).abs() < 1e-3);
        assert_eq!(state.pitch, 0.0);
        // Facing +X, so the camera sits at -X.
        let expected = Vec3::new(1.0 - cfg.distance, cfg.height, 1.0);
        assert!((state.current_position - expected).length() < 1e-4);
    }

    #[test]
    fn target_pitch_stays_clamped() {
        let cfg = CameraConfig::default();
        let physics = FakeWorld::default();
        let target = Transform::default();
        let mut state = CameraState::activate(&cfg, &target);
        for look in look_sequence(2000, 400.0) {
            step(&cfg, &mut state, look, DT, &target, &physics);
            assert!(state.pitch >= cfg.min_pitch && state.pitch <= cfg.max_pitch);
        }
    }

    #[test]
    fn smoothed_pitch_clamp_option() {
        let cfg = CameraConfig {
            clamp_smoothed_pitch: true,
            ..Default::default()
        };
        let physics = FakeWorld::default();
        let target = Transform::default();
        let mut state = CameraState::activate(&cfg, &target);
        for look in look_sequence(2000, 800.0) {
            step(&cfg, &mut state, look, DT, &target, &physics);
            assert!(state.current_pitch >= cfg.min_pitch);
            assert!(state.current_pitch <= cfg.max_pitch);
        }
    }

    #[test]
    fn look_up_lowers_pitch_unless_inverted() {
        let physics = FakeWorld::default();
        let target = Transform::default();
        let up = Vec2::new(0.0, 1.0);

        let cfg = CameraConfig::default();
        let mut state = CameraState::activate(&cfg, &target);
        step(&cfg, &mut state, up, DT, &target, &physics);
        assert!(state.pitch < 0.0);

        let inverted = CameraConfig {
            invert_y: true,
            ..Default::default()
        };
        let mut state = CameraState::activate(&inverted, &target);
        step(&inverted, &mut state, up, DT, &target, &physics);
        assert!(state.pitch > 0.0);
    }

    #[test]
    fn yaw_smoothing_wraps_short_way() {
        let cfg = CameraConfig::default();
        let physics = FakeWorld::default();
        let target = Transform::default();
        let mut state = CameraState {
            yaw: 350.0,
            current_yaw: 350.0,
            ..CameraState::activate(&cfg, &target)
        };
        // +20 degrees of yaw in one tick.
        let look = Vec2::new(20.0 / (cfg.sensitivity * DT), 0.0);
        step(&cfg, &mut state, look, DT, &target, &physics);
        assert!(state.current_yaw > 350.0 && state.current_yaw < 370.0);
    }

    #[test]
    fn position_converges_monotonically() {
        let cfg = CameraConfig::default();
        let physics = FakeWorld::default();
        let target = Transform::from_position(Vec3::new(4.0, 0.0, -3.0));
        let mut state = CameraState::activate(&cfg, &target);
        let ideal = state.current_position;
        state.current_position += Vec3::new(3.0, 1.0, -2.0);

        let mut prev = (state.current_position - ideal).length();
        for _ in 0..600 {
            step(&cfg, &mut state, Vec2::ZERO, DT, &target, &physics);
            let d = (state.current_position - ideal).length();
            assert!(d <= prev + 1e-5, "distance grew: {prev} -> {d}");
            prev = d;
        }
        assert!(prev < 1e-3, "final distance {prev}");
    }

    #[test]
    fn collision_clamps_to_hit_minus_radius() {
        let cfg = CameraConfig::default();
        let look_at = Vec3::new(0.0, 2.0, 0.0);
        let ideal = look_at + Vec3::new(0.0, 0.0, -cfg.distance);
        for d in [1.5_f32, 2.0, 3.7, 4.9] {
            let physics = FakeWorld {
                hit: Some(d),
                ..Default::default()
            };
            let r = resolve_collision(&cfg, &physics, look_at, ideal);
            let resolved = (r.position - look_at).length();
            let expected = (d - cfg.collision_radius).max(cfg.min_distance);
            assert!(r.clamped);
            assert!((resolved - expected).abs() < 1e-5);
            assert!(resolved <= d);
        }
    }

    #[test]
    fn collision_min_distance_wins_for_close_hits() {
        let cfg = CameraConfig::default();
        let look_at = Vec3::ZERO;
        let ideal = Vec3::new(0.0, 0.0, -cfg.distance);
        let physics = FakeWorld {
            hit: Some(0.5),
            ..Default::default()
        };
        let r = resolve_collision(&cfg, &physics, look_at, ideal);
        let distance = (r.position - look_at).length();
        assert!((distance - cfg.min_distance).abs() < 1e-5);
    }

    #[test]
    fn short_offset_skips_probe() {
        let cfg = CameraConfig::default();
        let physics = FakeWorld {
            hit: Some(0.01),
            ..Default::default()
        };
        let ideal = Vec3::new(0.0, 0.05, 0.0);
        let r = resolve_collision(&cfg, &physics, Vec3::ZERO, ideal);
        assert_eq!(r.position, ideal);
        assert_eq!(physics.casts.get(), 0);
    }

    #[test]
    fn collision_disabled_never_probes() {
        let cfg = CameraConfig {
            collision_enabled: false,
            ..Default::default()
        };
        let physics = FakeWorld {
            hit: Some(1.0),
            ..Default::default()
        };
        let target = Transform::default();
        let mut state = CameraState::activate(&cfg, &target);
        let fx = step(&cfg, &mut state, Vec2::ZERO, DT, &target, &physics);
        assert_eq!(physics.casts.get(), 0);
        assert!(!fx.resolved.clamped);
    }

    #[test]
    fn tick_steers_body_yaw_only() {
        let (mut world, id) = world_with_body(Transform::default());
        let mut cam = FollowCamera::new(CameraConfig::default()).with_target(id);
        for _ in 0..30 {
            cam.tick(&mut world, Some(Vec2::new(1.0, 0.5)), DT, &mut NoopObserver);
        }
        let yaw = cam.state().unwrap().current_yaw;
        let expected = Quat::from_rotation_y(yaw.to_radians());
        assert!(world.body.rotation.abs_diff_eq(expected, 1e-5));
        assert!(world.body.forward().y.abs() < 1e-6);
        assert_eq!(world.body.position, Vec3::ZERO);
    }

    #[test]
    fn camera_looks_at_target_point() {
        let (mut world, id) = world_with_body(Transform::from_position(Vec3::new(2.0, 0.0, 2.0)));
        let mut cam = FollowCamera::new(CameraConfig::default()).with_target(id);
        let look = Vec2::new(3.0, -2.0);
        cam.tick(&mut world, Some(look), DT, &mut NoopObserver);
        let t = cam.transform();
        let to_target = (Vec3::new(2.0, 2.0, 2.0) - t.position).normalize();
        assert!((t.forward() - to_target).length() < 1e-4);
    }

    #[test]
    fn tick_without_target_is_noop() {
        let (mut world, _id) = world_with_body(Transform::default());
        let mut cam = FollowCamera::new(CameraConfig::default());
        let out = cam.tick(&mut world, Some(Vec2::ZERO), DT, &mut NoopObserver);
        assert_eq!(out, TickOutcome::Skipped(SkipReason::MissingTarget));
        assert!(cam.state().is_none());

        cam.follow(Some(EntityId::new()));
        let out = cam.tick(&mut world, Some(Vec2::ZERO), DT, &mut NoopObserver);
        assert_eq!(out, TickOutcome::Skipped(SkipReason::MissingTarget));
    }

    #[test]
    fn tick_without_look_binding_is_noop() {
        let (mut world, id) = world_with_body(Transform::default());
        let mut cam = FollowCamera::new(CameraConfig::default()).with_target(id);
        cam.tick(&mut world, Some(Vec2::ZERO), DT, &mut NoopObserver);
        let before = *cam.state().unwrap();
        let out = cam.tick(&mut world, None, DT, &mut NoopObserver);
        assert_eq!(out, TickOutcome::Skipped(SkipReason::MissingInput));
        assert_eq!(*cam.state().unwrap(), before);
    }

    #[test]
    fn activation_captures_pointer_and_unlock_releases() {
        let (mut world, id) = world_with_body(Transform::default());
        let mut cam = FollowCamera::new(CameraConfig::default()).with_target(id);
        assert!(!cam.pointer().is_captured());
        cam.tick(&mut world, Some(Vec2::ZERO), DT, &mut NoopObserver);
        assert!(cam.pointer().is_captured());
        cam.handle_unlock(false);
        assert!(cam.pointer().is_captured());
        cam.handle_unlock(true);
        assert!(!cam.pointer().is_captured());
    }

    #[test]
    fn restored_state_holds_pointer_like_activation() {
        let (mut world, id) = world_with_body(Transform::default());
        let mut cam = FollowCamera::new(CameraConfig::default()).with_target(id);
        for _ in 0..10 {
            cam.tick(&mut world, Some(Vec2::new(1.0, 0.0)), DT, &mut NoopObserver);
        }

        let mut restored = FollowCamera::new(CameraConfig::default()).with_target(id);
        restored.set_state(cam.state().copied());
        assert!(restored.pointer().is_captured());
        assert_eq!(restored.pointer(), cam.pointer());
        assert_eq!(restored.transform().position, cam.transform().position);

        restored.set_state(None);
        assert!(!restored.pointer().is_captured());
    }

    #[test]
    fn set_distance_clamps() {
        let mut cam = FollowCamera::new(CameraConfig::default());
        cam.set_distance(50.0);
        assert_eq!(cam.config().distance, 10.0);
        cam.set_distance(0.0);
        assert_eq!(cam.config().distance, 1.0);
    }

    #[test]
    fn wall_behind_player_pulls_camera_in() {
        let mut scene = Scene::with_ground();
        // Wall face at z = -3, behind a player facing +Z.
        scene.add_collider(StaticCollider::new(Shape::Box {
            center: Vec3::new(0.0, 3.0, -3.5),
            half_extents: Vec3::new(10.0, 3.0, 0.5),
        }));
        let id = scene.spawn(Transform::from_position(Vec3::new(0.0, 1.0, 0.0)));
        let mut cam = FollowCamera::new(CameraConfig::default()).with_target(id);
        for _ in 0..240 {
            cam.tick(&mut scene, Some(Vec2::ZERO), DT, &mut NoopObserver);
        }
        let z = cam.transform().position.z;
        assert!(z > -3.0, "camera went through the wall: z = {z}");
        let expected = -(3.0 - 0.3) + 0.3;
        assert!((z - expected).abs() < 0.05, "z = {z}");
    }
}
