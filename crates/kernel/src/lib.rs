//! Host boundary: the capabilities a frame update consumes from the engine.
//!
//! # Invariants
//! - Controller code reaches the host only through [`Host`] and its parts.
//! - The reference [`Scene`] is a collaborator for tools and tests; it owns
//!   positions, never controller state.

pub mod host;
pub mod observer;
pub mod scene;

pub use host::{CharacterMover, Host, PhysicsQuery, TransformAccess};
pub use observer::{FrameObserver, NoopObserver, Phase, SkipReason};
pub use scene::{CastHit, CharacterBody, EntityData, Scene, Shape, StaticCollider};
