use std::collections::BTreeMap;
use thirdperson_camera::{FollowCamera, TickOutcome as CameraOutcome};
use thirdperson_common::EntityId;
use thirdperson_input::FrameInput;
use thirdperson_kernel::{FrameObserver, Host, NoopObserver, Phase, SkipReason};
use thirdperson_locomotion::{Locomotion, LocomotionConfig, TickOutcome as LocomotionOutcome};

use crate::config::RigConfig;

/// What happened during one [`Rig::frame`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Frame counter before this frame ran.
    pub frame: u64,
    /// Set when the whole frame was dropped.
    pub skipped: Option<SkipReason>,
    /// Update phase, in entity order.
    pub locomotion: Vec<(EntityId, LocomotionOutcome)>,
    /// Late phase, in camera insertion order.
    pub cameras: Vec<CameraOutcome>,
}

/// Players and cameras driven together, one frame at a time.
#[derive(Debug, Clone, Default)]
pub struct Rig {
    players: BTreeMap<EntityId, Locomotion>,
    cameras: Vec<FollowCamera>,
    frame: u64,
}

impl Rig {
    pub fn new() -> Self {
        Self::default()
    }

    /// One player on `entity` with a camera following it.
    pub fn single(config: &RigConfig, entity: EntityId) -> Self {
        let mut rig = Self::new();
        rig.add_player(entity, config.locomotion);
        rig.add_camera(FollowCamera::new(config.camera).with_target(entity));
        rig
    }

    /// Attach locomotion to `entity`, replacing any existing controller.
    pub fn add_player(&mut self, entity: EntityId, config: LocomotionConfig) -> Option<Locomotion> {
        tracing::debug!(?entity, "player added");
        self.players.insert(entity, Locomotion::new(entity, config))
    }

    pub fn remove_player(&mut self, entity: EntityId) -> Option<Locomotion> {
        self.players.remove(&entity)
    }

    /// Returns the camera's index.
    pub fn add_camera(&mut self, camera: FollowCamera) -> usize {
        self.cameras.push(camera);
        self.cameras.len() - 1
    }

    pub fn player(&self, entity: EntityId) -> Option<&Locomotion> {
        self.players.get(&entity)
    }

    pub fn player_mut(&mut self, entity: EntityId) -> Option<&mut Locomotion> {
        self.players.get_mut(&entity)
    }

    pub fn players(&self) -> impl Iterator<Item = &Locomotion> {
        self.players.values()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn cameras(&self) -> &[FollowCamera] {
        &self.cameras
    }

    pub fn camera_mut(&mut self, index: usize) -> Option<&mut FollowCamera> {
        self.cameras.get_mut(index)
    }

    /// First camera whose target is `entity`.
    pub fn camera_following(&self, entity: EntityId) -> Option<&FollowCamera> {
        self.cameras.iter().find(|c| c.target() == Some(entity))
    }

    pub fn camera_following_mut(&mut self, entity: EntityId) -> Option<&mut FollowCamera> {
        self.cameras.iter_mut().find(|c| c.target() == Some(entity))
    }

    /// Frames run so far, excluding skipped ones.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn set_frame_count(&mut self, frame: u64) {
        self.frame = frame;
    }

    pub fn frame<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        input: &FrameInput,
        dt: f32,
    ) -> FrameReport {
        self.frame_observed(host, input, dt, &mut NoopObserver)
    }

    /// Run the update phase for every player, then the late phase for every camera.
    pub fn frame_observed<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        input: &FrameInput,
        dt: f32,
        observer: &mut dyn FrameObserver,
    ) -> FrameReport {
        let mut report = FrameReport {
            frame: self.frame,
            ..FrameReport::default()
        };
        if !dt.is_finite() || dt < 0.0 {
            tracing::warn!(dt, frame = self.frame, "frame skipped: invalid delta");
            observer.on_skip(Phase::Update, None, SkipReason::InvalidDelta);
            report.skipped = Some(SkipReason::InvalidDelta);
            return report;
        }

        let _span = tracing::debug_span!("frame", frame = self.frame).entered();

        let locomotion = input.locomotion.as_ref();
        report.locomotion = self
            .players
            .values_mut()
            .map(|player| {
                let outcome = player.tick(host, locomotion, dt, observer);
                (player.entity(), outcome)
            })
            .collect();

        report.cameras = self
            .cameras
            .iter_mut()
            .map(|camera| {
                let outcome = camera.tick(host, input.look, dt, observer);
                camera.handle_unlock(input.unlock_pressed);
                outcome
            })
            .collect();

        self.frame += 1;
        report
    }
}
