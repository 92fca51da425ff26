use glam::{Quat, Vec3};
use thirdperson_common::{EntityId, LayerMask, Transform};

/// Geometric probes against scene collision.
pub trait PhysicsQuery {
    /// Whether a sphere at `center` overlaps any collider on `mask`.
    fn check_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> bool;

    /// Sweep a sphere from `origin` along `direction` for at most `max_distance`.
    /// Returns the travelled distance at first contact.
    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<f32>;
}

/// Collision-aware move primitive for character bodies.
pub trait CharacterMover {
    /// Apply `displacement` to the entity, stopping or sliding against geometry.
    /// Returns the resulting position, or `None` if the entity does not exist.
    fn move_character(&mut self, id: EntityId, displacement: Vec3) -> Option<Vec3>;
}

/// Read/write access to entity transforms.
pub trait TransformAccess {
    fn transform(&self, id: EntityId) -> Option<Transform>;

    /// Teleport without collision. Returns `false` if the entity does not exist.
    fn set_position(&mut self, id: EntityId, position: Vec3) -> bool;

    /// Overwrite orientation only. Returns `false` if the entity does not exist.
    fn set_rotation(&mut self, id: EntityId, rotation: Quat) -> bool;
}

/// Everything a frame update needs from the engine.
pub trait Host: PhysicsQuery + CharacterMover + TransformAccess {}

impl<T: PhysicsQuery + CharacterMover + TransformAccess + ?Sized> Host for T {}
