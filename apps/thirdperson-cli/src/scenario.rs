use clap::ValueEnum;
use glam::{Vec2, Vec3};
use thirdperson_common::{EntityId, Transform};
use thirdperson_input::{DeviceFrame, Key};
use thirdperson_kernel::{CharacterBody, Scene, Shape, StaticCollider};

/// Scripted device input for headless runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Script {
    /// No input at all.
    Idle,
    /// Hold forward.
    Walk,
    /// Hold forward and sprint.
    Sprint,
    /// Tap jump twice while standing.
    Jump,
    /// Sweep the mouse right and slightly up.
    Orbit,
    /// Sprint into the wall ahead, then strafe along it.
    Wall,
}

impl Script {
    pub fn device_frame(self, tick: u64) -> DeviceFrame {
        let frame = DeviceFrame::new();
        match self {
            Self::Idle => frame,
            Self::Walk => frame.with_key(Key::W),
            Self::Sprint => frame.with_key(Key::W).with_key(Key::LeftShift),
            Self::Jump => {
                // Held for several frames; only the press edge should jump.
                if (10..15).contains(&tick) || (90..95).contains(&tick) {
                    frame.with_key(Key::Space)
                } else {
                    frame
                }
            }
            Self::Orbit => frame.with_mouse_delta(Vec2::new(1.5, 0.2)),
            Self::Wall => {
                let frame = frame.with_key(Key::W).with_key(Key::LeftShift);
                if tick >= 90 {
                    frame.with_key(Key::D)
                } else {
                    frame
                }
            }
        }
    }
}

/// Flat ground plus one wall six units ahead of the spawn point.
pub fn demo_scene(body: CharacterBody) -> (Scene, EntityId) {
    let mut scene = Scene::with_ground();
    scene.add_collider(StaticCollider::new(Shape::Box {
        center: Vec3::new(0.0, 1.5, 6.5),
        half_extents: Vec3::new(8.0, 1.5, 0.5),
    }));
    let spawn_height = body.height * 0.5 + body.skin_width;
    let id = scene.spawn_character(Transform::from_position(Vec3::Y * spawn_height), body);
    (scene, id)
}

/// Same geometry as [`demo_scene`], with the player spawned under a known id.
pub fn demo_scene_with_id(body: CharacterBody, id: EntityId, at: Transform) -> Scene {
    let (mut scene, spawned) = demo_scene(body);
    scene.despawn(spawned);
    scene.spawn_with_id(id, at, Some(body));
    scene
}
