use serde::{Deserialize, Serialize};
use thirdperson_camera::CameraState;
use thirdperson_common::{EntityId, Transform};
use thirdperson_kernel::TransformAccess;
use thirdperson_locomotion::LocomotionState;
use thirdperson_rig::Rig;

use crate::snapshot::SnapshotError;

/// Everything needed to resume one player and its camera mid-trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerState {
    /// Rig frame counter at capture.
    pub tick: u64,
    pub entity: EntityId,
    pub body: Transform,
    pub locomotion: LocomotionState,
    /// `None` if no camera follows the entity or it has not activated yet.
    pub camera: Option<CameraState>,
}

impl ControllerState {
    pub fn capture<H: TransformAccess + ?Sized>(
        rig: &Rig,
        host: &H,
        entity: EntityId,
    ) -> Result<Self, SnapshotError> {
        let player = rig
            .player(entity)
            .ok_or(SnapshotError::UnknownPlayer(entity))?;
        let body = host
            .transform(entity)
            .ok_or(SnapshotError::MissingBody(entity))?;
        Ok(Self {
            tick: rig.frame_count(),
            entity,
            body,
            locomotion: *player.state(),
            camera: rig
                .camera_following(entity)
                .and_then(|c| c.state().copied()),
        })
    }

    /// Write this state back into `rig` and `host`.
    ///
    /// The rig must already hold a player for `entity`; the host must already
    /// hold its body.
    pub fn restore<H: TransformAccess + ?Sized>(
        &self,
        rig: &mut Rig,
        host: &mut H,
    ) -> Result<(), SnapshotError> {
        let player = rig
            .player_mut(self.entity)
            .ok_or(SnapshotError::UnknownPlayer(self.entity))?;
        if !host.set_position(self.entity, self.body.position)
            || !host.set_rotation(self.entity, self.body.rotation)
        {
            return Err(SnapshotError::MissingBody(self.entity));
        }
        player.set_state(self.locomotion);
        if let Some(camera) = rig.camera_following_mut(self.entity) {
            camera.set_state(self.camera);
        }
        rig.set_frame_count(self.tick);
        tracing::debug!(entity = ?self.entity, tick = self.tick, "controller state restored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Snapshot;
    use glam::{Vec2, Vec3};
    use thirdperson_input::FrameInput;
    use thirdperson_kernel::{CharacterBody, Scene, Shape, StaticCollider};
    use thirdperson_rig::RigConfig;

    const DT: f32 = 1.0 / 60.0;
    const FRAMES: usize = 180;

    fn world() -> Scene {
        let mut scene = Scene::with_ground();
        scene.add_collider(StaticCollider::new(Shape::Box {
            center: Vec3::new(2.0, 1.0, 6.0),
            half_extents: Vec3::new(4.0, 2.0, 0.5),
        }));
        scene
    }

    /// Walk, sprint, jump twice and sweep the camera.
    fn script(frame: usize) -> FrameInput {
        let look = Vec2::new(((frame as f32) * 0.05).sin() * 0.4, 0.15);
        FrameInput::idle()
            .with_move(Vec2::new(0.3, 1.0))
            .with_sprint(frame > 60)
            .with_jump(frame == 20 || frame == 95)
            .with_look(look)
    }

    fn run(
        scene: &mut Scene,
        rig: &mut Rig,
        id: EntityId,
        frames: std::ops::Range<usize>,
    ) -> Vec<(Vec3, Vec3)> {
        frames
            .map(|f| {
                rig.frame(scene, &script(f), DT);
                let body = scene.transform(id).unwrap().position;
                let camera = rig.camera_following(id).unwrap().transform().position;
                (body, camera)
            })
            .collect()
    }

    fn spawn(scene: &mut Scene, id: EntityId) {
        scene.spawn_with_id(
            id,
            Transform::from_position(Vec3::new(0.0, 1.02, 0.0)),
            Some(CharacterBody::default()),
        );
    }

    #[test]
    fn restore_resumes_identical_trajectory() {
        let config = RigConfig::default();
        let id = EntityId::new();

        let mut scene = world();
        spawn(&mut scene, id);
        let mut rig = Rig::single(&config, id);
        let full = run(&mut scene, &mut rig, id, 0..FRAMES);

        for split in [1, 25, 100] {
            let mut scene = world();
            spawn(&mut scene, id);
            let mut rig = Rig::single(&config, id);
            run(&mut scene, &mut rig, id, 0..split);

            let state = ControllerState::capture(&rig, &scene, id).unwrap();
            let bytes = Snapshot::capture(state).unwrap().to_cbor().unwrap();
            let restored = Snapshot::from_cbor(&bytes).unwrap();

            let mut fresh_scene = world();
            spawn(&mut fresh_scene, id);
            let mut fresh_rig = Rig::single(&config, id);
            let state = restored.state;
            state.restore(&mut fresh_rig, &mut fresh_scene).unwrap();
            assert_eq!(fresh_rig.frame_count(), split as u64);
            let pointer = |rig: &Rig| *rig.camera_following(id).unwrap().pointer();
            assert_eq!(pointer(&fresh_rig), pointer(&rig));
            assert!(pointer(&fresh_rig).is_captured());

            let resumed = run(&mut fresh_scene, &mut fresh_rig, id, split..FRAMES);
            assert_eq!(resumed, full[split..], "diverged after split at {split}");
        }
    }

    #[test]
    fn capture_before_first_frame_has_no_camera_state() {
        let mut scene = world();
        let id = EntityId::new();
        spawn(&mut scene, id);
        let rig = Rig::single(&RigConfig::default(), id);
        let state = ControllerState::capture(&rig, &scene, id).unwrap();
        assert_eq!(state.tick, 0);
        assert!(state.camera.is_none());
        assert!(!state.locomotion.is_grounded);
    }

    #[test]
    fn capture_unknown_entity_fails() {
        let scene = world();
        let rig = Rig::new();
        assert!(matches!(
            ControllerState::capture(&rig, &scene, EntityId::new()),
            Err(SnapshotError::UnknownPlayer(_))
        ));

        let id = EntityId::new();
        let rig = Rig::single(&RigConfig::default(), id);
        assert!(matches!(
            ControllerState::capture(&rig, &scene, id),
            Err(SnapshotError::MissingBody(_))
        ));
    }

    #[test]
    fn restore_into_host_without_body_fails() {
        let mut scene = world();
        let id = EntityId::new();
        spawn(&mut scene, id);
        let mut rig = Rig::single(&RigConfig::default(), id);
        rig.frame(&mut scene, &FrameInput::idle(), DT);
        let state = ControllerState::capture(&rig, &scene, id).unwrap();

        let mut empty = world();
        assert!(matches!(
            state.restore(&mut rig, &mut empty),
            Err(SnapshotError::MissingBody(_))
        ));
    }
}
