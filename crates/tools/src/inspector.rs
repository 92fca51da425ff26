use thirdperson_camera::FollowCamera;
use thirdperson_common::EntityId;
use thirdperson_kernel::TransformAccess;
use thirdperson_rig::Rig;

/// Read-only queries against a rig and its host, for debugging and dev UI.
pub struct RigInspector;

impl RigInspector {
    pub fn summary<H: TransformAccess + ?Sized>(rig: &Rig, host: &H) -> RigSummary {
        RigSummary {
            frame: rig.frame_count(),
            players: rig.player_count(),
            grounded: rig.players().filter(|p| p.state().is_grounded).count(),
            missing_bodies: rig
                .players()
                .filter(|p| host.transform(p.entity()).is_none())
                .count(),
            cameras: rig.cameras().len(),
            active_cameras: rig.cameras().iter().filter(|c| c.state().is_some()).count(),
            pointer_captured: rig.cameras().iter().any(|c| c.pointer().is_captured()),
        }
    }

    pub fn inspect_player<H: TransformAccess + ?Sized>(
        rig: &Rig,
        host: &H,
        id: EntityId,
    ) -> Option<PlayerInfo> {
        let player = rig.player(id)?;
        let body = host.transform(id)?;
        Some(PlayerInfo {
            id,
            position: body.position.to_array(),
            yaw: body.yaw_degrees(),
            vertical_velocity: player.state().vertical_velocity,
            grounded: player.state().is_grounded,
        })
    }

    pub fn inspect_cameras(rig: &Rig) -> Vec<CameraInfo> {
        rig.cameras().iter().map(CameraInfo::from).collect()
    }
}

/// Rig-wide counts.
#[derive(Debug, Clone, PartialEq)]
pub struct RigSummary {
    pub frame: u64,
    pub players: usize,
    pub grounded: usize,
    /// Players whose body is gone from the host.
    pub missing_bodies: usize,
    pub cameras: usize,
    pub active_cameras: usize,
    pub pointer_captured: bool,
}

impl std::fmt::Display for RigSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Rig: frame={} players={} grounded={} missing={} cameras={}/{} active pointer={}",
            self.frame,
            self.players,
            self.grounded,
            self.missing_bodies,
            self.active_cameras,
            self.cameras,
            if self.pointer_captured {
                "captured"
            } else {
                "free"
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInfo {
    pub id: EntityId,
    pub position: [f32; 3],
    pub yaw: f32,
    pub vertical_velocity: f32,
    pub grounded: bool,
}

impl std::fmt::Display for PlayerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Player [{:.8}] pos=({:.2}, {:.2}, {:.2}) yaw={:.1} vy={:.2} {}",
            &self.id.0.to_string()[..8],
            self.position[0],
            self.position[1],
            self.position[2],
            self.yaw,
            self.vertical_velocity,
            if self.grounded {
                "grounded"
            } else {
                "airborne"
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraInfo {
    pub target: Option<EntityId>,
    pub position: [f32; 3],
    /// Smoothed orbit angles; `None` until the camera activates.
    pub angles: Option<(f32, f32)>,
    pub distance: f32,
}

impl From<&FollowCamera> for CameraInfo {
    fn from(camera: &FollowCamera) -> Self {
        Self {
            target: camera.target(),
            position: camera.transform().position.to_array(),
            angles: camera.state().map(|s| (s.current_yaw, s.current_pitch)),
            distance: camera.config().distance,
        }
    }
}

impl std::fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let target = match self.target {
            Some(id) => id.0.to_string()[..8].to_string(),
            None => "none".to_string(),
        };
        write!(
            f,
            "Camera -> [{target}] pos=({:.2}, {:.2}, {:.2}) dist={:.1}",
            self.position[0], self.position[1], self.position[2], self.distance
        )?;
        if let Some((yaw, pitch)) = self.angles {
            write!(f, " yaw={yaw:.1} pitch={pitch:.1}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use thirdperson_common::Transform;
    use thirdperson_input::FrameInput;
    use thirdperson_kernel::{CharacterBody, Scene};
    use thirdperson_rig::RigConfig;

    fn setup() -> (Scene, Rig, EntityId) {
        let mut scene = Scene::with_ground();
        let id = scene.spawn_character(
            Transform::from_position(Vec3::new(1.0, 1.02, 2.0)),
            CharacterBody::default(),
        );
        (scene, Rig::single(&RigConfig::default(), id), id)
    }

    #[test]
    fn summary_before_and_after_first_frame() {
        let (mut scene, mut rig, _) = setup();
        let before = RigInspector::summary(&rig, &scene);
        assert_eq!(before.frame, 0);
        assert_eq!(before.players, 1);
        assert_eq!(before.active_cameras, 0);
        assert!(!before.pointer_captured);

        rig.frame(&mut scene, &FrameInput::idle(), 1.0 / 60.0);
        let after = RigInspector::summary(&rig, &scene);
        assert_eq!(after.frame, 1);
        assert_eq!(after.grounded, 1);
        assert_eq!(after.active_cameras, 1);
        assert!(after.pointer_captured);
        assert!(after.to_string().contains("pointer=captured"));
    }

    #[test]
    fn summary_counts_missing_bodies() {
        let (mut scene, rig, id) = setup();
        scene.despawn(id);
        assert_eq!(RigInspector::summary(&rig, &scene).missing_bodies, 1);
        assert!(RigInspector::inspect_player(&rig, &scene, id).is_none());
    }

    #[test]
    fn inspect_player_reports_body() {
        let (scene, rig, id) = setup();
        let info = RigInspector::inspect_player(&rig, &scene, id).unwrap();
        assert_eq!(info.position, [1.0, 1.02, 2.0]);
        assert!(!info.grounded);
        let text = info.to_string();
        assert!(text.contains("pos=(1.00, 1.02, 2.00)"));
        assert!(text.contains("airborne"));
    }

    #[test]
    fn cameras_listed_with_angles_once_active() {
        let (mut scene, mut rig, id) = setup();
        assert!(RigInspector::inspect_cameras(&rig)[0].angles.is_none());

        rig.frame(&mut scene, &FrameInput::idle(), 1.0 / 60.0);
        let cams = RigInspector::inspect_cameras(&rig);
        assert_eq!(cams.len(), 1);
        assert_eq!(cams[0].target, Some(id));
        assert!(cams[0].angles.is_some());
        assert!(cams[0].to_string().contains("dist=5.0"));
    }
}
