use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thirdperson_common::{EntityId, LayerMask, Transform};

use crate::host::{CharacterMover, PhysicsQuery, TransformAccess};

/// Sphere-trace iteration cap per cast.
const MAX_MARCH_STEPS: usize = 128;
/// Distance at which a traced sphere counts as touching.
const HIT_EPSILON: f32 = 1e-4;
/// Central-difference step for surface normals.
const NORMAL_EPSILON: f32 = 1e-3;
/// Collide-and-slide iterations per move.
const MAX_SLIDE_ITERATIONS: usize = 4;
/// Displacements shorter than this are dropped.
const MIN_MOVE: f32 = 1e-5;

/// Static collision shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Half-space below `dot(normal, p) = offset`.
    Plane { normal: Vec3, offset: f32 },
    Box { center: Vec3, half_extents: Vec3 },
    Sphere { center: Vec3, radius: f32 },
}

impl Shape {
    /// Signed distance from `p` to the surface; negative inside.
    pub fn distance(&self, p: Vec3) -> f32 {
        match *self {
            Shape::Plane { normal, offset } => normal.normalize_or_zero().dot(p) - offset,
            Shape::Box {
                center,
                half_extents,
            } => {
                let q = (p - center).abs() - half_extents;
                q.max(Vec3::ZERO).length() + q.max_element().min(0.0)
            }
            Shape::Sphere { center, radius } => (p - center).length() - radius,
        }
    }
}

/// A static collider on one layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticCollider {
    pub shape: Shape,
    pub layer: u32,
}

impl StaticCollider {
    pub fn new(shape: Shape) -> Self {
        Self { shape, layer: 0 }
    }

    pub fn on_layer(mut self, layer: u32) -> Self {
        self.layer = layer;
        self
    }
}

/// Upright capsule used by the collide-and-slide mover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterBody {
    pub radius: f32,
    /// Total height, end cap to end cap, centred on the transform position.
    pub height: f32,
    /// Gap kept between the capsule and geometry after a move.
    pub skin_width: f32,
    pub collision_mask: LayerMask,
}

impl Default for CharacterBody {
    fn default() -> Self {
        Self {
            radius: 0.5,
            height: 2.0,
            skin_width: 0.02,
            collision_mask: LayerMask::ALL,
        }
    }
}

impl CharacterBody {
    /// Sphere centres (offsets from the body position) covering the capsule segment.
    fn sphere_offsets(&self) -> Vec<f32> {
        let half = (self.height * 0.5 - self.radius).max(0.0);
        if half == 0.0 {
            return vec![0.0];
        }
        let spacing = self.radius.max(0.05);
        let count = ((2.0 * half) / spacing).ceil() as usize;
        (0..=count)
            .map(|i| -half + 2.0 * half * i as f32 / count as f32)
            .collect()
    }
}

/// First contact of a swept sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastHit {
    pub distance: f32,
    pub normal: Vec3,
}

/// Per-entity data stored in the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityData {
    pub transform: Transform,
    pub body: Option<CharacterBody>,
}

/// Reference host: static geometry plus character bodies.
///
/// Entities live in a BTreeMap so iteration order is deterministic.
/// Queries are analytic signed-distance sphere traces; no dynamic-vs-dynamic
/// collision is modelled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    entities: BTreeMap<EntityId, EntityData>,
    colliders: Vec<StaticCollider>,
}

impl Scene {
    /// Create a scene with no geometry and no entities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene with a single ground plane at `y = 0` on layer 0.
    pub fn with_ground() -> Self {
        let mut scene = Self::new();
        scene.add_collider(StaticCollider::new(Shape::Plane {
            normal: Vec3::Y,
            offset: 0.0,
        }));
        scene
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn colliders(&self) -> &[StaticCollider] {
        &self.colliders
    }

    pub fn add_collider(&mut self, collider: StaticCollider) {
        self.colliders.push(collider);
    }

    pub fn entities(&self) -> &BTreeMap<EntityId, EntityData> {
        &self.entities
    }

    /// Spawn a body-less entity (e.g. a camera).
    pub fn spawn(&mut self, transform: Transform) -> EntityId {
        let id = EntityId::new();
        self.spawn_with_id(id, transform, None);
        id
    }

    /// Spawn an entity moved by the collide-and-slide mover.
    pub fn spawn_character(&mut self, transform: Transform, body: CharacterBody) -> EntityId {
        let id = EntityId::new();
        self.spawn_with_id(id, transform, Some(body));
        id
    }

    pub fn spawn_with_id(
        &mut self,
        id: EntityId,
        transform: Transform,
        body: Option<CharacterBody>,
    ) {
        tracing::debug!(?id, position = ?transform.position, "spawn");
        self.entities.insert(id, EntityData { transform, body });
    }

    pub fn despawn(&mut self, id: EntityId) -> Option<EntityData> {
        tracing::debug!(?id, "despawn");
        self.entities.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityData> {
        self.entities.get(&id)
    }

    /// Overwrite a full transform (teleport; no collision).
    pub fn set_transform(&mut self, id: EntityId, new: Transform) -> bool {
        let Some(data) = self.entities.get_mut(&id) else {
            return false;
        };
        data.transform = new;
        true
    }

    /// Signed distance from `p` to the nearest collider on `mask`.
    pub fn distance(&self, p: Vec3, mask: LayerMask) -> f32 {
        self.colliders
            .iter()
            .filter(|c| mask.contains(c.layer))
            .map(|c| c.shape.distance(p))
            .fold(f32::INFINITY, f32::min)
    }

    fn surface_normal(&self, p: Vec3, mask: LayerMask) -> Vec3 {
        let e = NORMAL_EPSILON;
        let grad = Vec3::new(
            self.distance(p + Vec3::X * e, mask) - self.distance(p - Vec3::X * e, mask),
            self.distance(p + Vec3::Y * e, mask) - self.distance(p - Vec3::Y * e, mask),
            self.distance(p + Vec3::Z * e, mask) - self.distance(p - Vec3::Z * e, mask),
        );
        grad.try_normalize().unwrap_or(Vec3::Y)
    }

    /// Sphere-trace a swept sphere. A sphere already touching geometry hits at 0.
    pub fn cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<CastHit> {
        let dir = direction.try_normalize()?;
        if max_distance.is_nan() || max_distance < 0.0 {
            return None;
        }
        let mut t = 0.0;
        for _ in 0..MAX_MARCH_STEPS {
            let p = origin + dir * t;
            let d = self.distance(p, mask) - radius;
            if d <= HIT_EPSILON {
                return Some(CastHit {
                    distance: t,
                    normal: self.surface_normal(p, mask),
                });
            }
            t += d;
            if t > max_distance {
                return None;
            }
        }
        None
    }

    fn cast_body(
        &self,
        body: &CharacterBody,
        position: Vec3,
        dir: Vec3,
        max_distance: f32,
    ) -> Option<CastHit> {
        body.sphere_offsets()
            .into_iter()
            .filter_map(|offset| {
                self.cast(
                    position + Vec3::Y * offset,
                    body.radius,
                    dir,
                    max_distance,
                    body.collision_mask,
                )
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Collide-and-slide: advance until contact, then project the remainder
    /// onto the contact plane and continue.
    fn slide(&self, body: &CharacterBody, start: Vec3, displacement: Vec3) -> Vec3 {
        let mut position = start;
        let mut remaining = displacement;
        for _ in 0..MAX_SLIDE_ITERATIONS {
            let length = remaining.length();
            if length < MIN_MOVE {
                break;
            }
            let dir = remaining / length;
            let Some(hit) = self.cast_body(body, position, dir, length + body.skin_width) else {
                position += remaining;
                break;
            };
            // Starting in contact but moving away from the surface.
            if hit.distance <= 0.0 && dir.dot(hit.normal) >= 0.0 {
                position += remaining;
                break;
            }
            let travel = (hit.distance - body.skin_width).clamp(0.0, length);
            position += dir * travel;
            remaining = clip_against(remaining - dir * travel, hit.normal);
            tracing::trace!(?hit.normal, travel, "slide contact");
        }
        position
    }
}

/// Remove the component of `v` pointing into the plane with `normal`.
fn clip_against(v: Vec3, normal: Vec3) -> Vec3 {
    let backoff = v.dot(normal);
    if backoff < 0.0 {
        v - normal * backoff
    } else {
        v
    }
}

impl PhysicsQuery for Scene {
    fn check_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> bool {
        self.distance(center, mask) <= radius
    }

    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<f32> {
        self.cast(origin, radius, direction, max_distance, mask)
            .map(|hit| hit.distance)
    }
}

impl CharacterMover for Scene {
    fn move_character(&mut self, id: EntityId, displacement: Vec3) -> Option<Vec3> {
        let data = self.entities.get(&id)?;
        let from = data.transform.position;
        let to = match data.body {
            Some(ref body) => self.slide(body, from, displacement),
            None => from + displacement,
        };
        if let Some(data) = self.entities.get_mut(&id) {
            data.transform.position = to;
        }
        Some(to)
    }
}

impl TransformAccess for Scene {
    fn transform(&self, id: EntityId) -> Option<Transform> {
        self.entities.get(&id).map(|d| d.transform)
    }

    fn set_position(&mut self, id: EntityId, position: Vec3) -> bool {
        let Some(data) = self.entities.get_mut(&id) else {
            return false;
        };
        data.transform.position = position;
        true
    }

    fn set_rotation(&mut self, id: EntityId, rotation: Quat) -> bool {
        let Some(data) = self.entities.get_mut(&id) else {
            return false;
        };
        data.transform.rotation = rotation;
        true
    }
}
