use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an entity owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Spatial transform: position, rotation, scale.
///
/// Axis convention: Y is up, local +Z is forward, local +X is right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Transform at `position` facing `yaw_degrees` around the up axis.
    pub fn from_position_yaw(position: Vec3, yaw_degrees: f32) -> Self {
        Self {
            position,
            rotation: Quat::from_rotation_y(yaw_degrees.to_radians()),
            ..Self::default()
        }
    }

    /// Local right axis in world space.
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Local up axis in world space.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Local forward axis in world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Heading around the world up axis, in degrees.
    pub fn yaw_degrees(&self) -> f32 {
        let (yaw, _, _) = self.rotation.to_euler(EulerRot::YXZ);
        yaw.to_degrees()
    }

    /// Map a point from local space into world space (scale ignored for offsets
    /// so probes stay at a fixed distance).
    pub fn transform_offset(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }
}

/// Bitmask selecting which collision layers a query considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);

    /// Mask containing only `layer`. Layers outside 0..32 give an empty mask.
    pub const fn layer(layer: u32) -> Self {
        Self(bit(layer))
    }

    pub const fn contains(self, layer: u32) -> bool {
        self.0 & bit(layer) != 0
    }

    pub const fn without(self, layer: u32) -> Self {
        Self(self.0 & !bit(layer))
    }
}

const fn bit(layer: u32) -> u32 {
    if layer < u32::BITS { 1 << layer } else { 0 }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_uniqueness() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.forward(), Vec3::Z);
        assert_eq!(t.right(), Vec3::X);
    }

    #[test]
    fn yaw_ninety_faces_positive_x() {
        let t = Transform::from_position_yaw(Vec3::ZERO, 90.0);
        assert!((t.forward() - Vec3::X).length() < 1e-5);
        assert!((t.right() + Vec3::Z).length() < 1e-5);
        assert!((t.yaw_degrees() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn offset_follows_rotation() {
        let t = Transform::from_position_yaw(Vec3::new(1.0, 2.0, 3.0), 180.0);
        let p = t.transform_offset(Vec3::new(0.0, -1.0, 1.0));
        assert!((p - Vec3::new(1.0, 1.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn layer_mask_membership() {
        let mask = LayerMask::ALL.without(3);
        assert!(mask.contains(0));
        assert!(!mask.contains(3));
        assert!(LayerMask::layer(5).contains(5));
        assert!(!LayerMask::NONE.contains(0));
        assert!(!LayerMask::ALL.contains(40));
    }

    #[test]
    fn out_of_range_layers_are_empty() {
        assert_eq!(LayerMask::layer(32), LayerMask::NONE);
        assert_eq!(LayerMask::layer(u32::MAX), LayerMask::NONE);
        assert_eq!(LayerMask::ALL.without(40), LayerMask::ALL);
        assert!(!LayerMask::layer(31).contains(32));
        assert!(LayerMask::layer(31).contains(31));
    }
}
