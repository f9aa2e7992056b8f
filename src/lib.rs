//! QuadSweep – raycast collision engine for 2D games in Rust.
//!
//! Bodies are axis-aligned rectangles. Rigidbodies move by casting fans of
//! short rays along each axis and clamping their displacement to the nearest
//! solid hit, which keeps fast bodies from tunnelling through thin geometry.
//! A loose quadtree accelerates the rays, and a contact manager turns the
//! per-tick hits into enter/exit events.

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod events;
pub mod utils;
pub mod world;

pub use glam::Vec2;

pub use collision::{
    contact::Contact,
    quadtree::{QuadTree, SpatialPosition},
    queries::{Ray, RayHit, RayQuery},
};
pub use config::{PhysicsSettings, QuadTreeSettings, QueryBackend};
pub use crate::core::{
    body::Body,
    collider::{Collider, ColliderBuilder},
    platform::Platform,
    rigidbody::{CollisionDetectionMode, CollisionRecord, Rigidbody},
    types::{Direction, Rect},
};
pub use dynamics::{integrator::Integrator, sweep::SimulateOutcome};
pub use error::{PhysicsError, Result};
pub use events::{
    ContactEvent, ContactEvents, ContactKind, ContactPhase, ContactRecorder, EventChannel,
    SubscriptionId,
};
pub use utils::allocator::{Arena, ColliderId};
pub use world::PhysicsWorld;

/// High-level convenience wrapper that owns a [`PhysicsWorld`].
pub struct PhysicsEngine {
    world: PhysicsWorld,
}

impl PhysicsEngine {
    /// Creates an engine from startup settings.
    pub fn new(settings: PhysicsSettings) -> Result<Self> {
        Ok(Self {
            world: PhysicsWorld::new(settings)?,
        })
    }

    /// Adds the collider and registers a rigidbody for it.
    pub fn spawn_rigidbody(&mut self, collider: Collider, body: Rigidbody) -> Result<ColliderId> {
        let id = self.world.add_collider(collider);
        if let Err(err) = self.world.push_rigidbody(id, body) {
            self.world.destroy_body(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Adds the collider and registers it as a platform.
    pub fn spawn_platform(&mut self, collider: Collider) -> Result<ColliderId> {
        let id = self.world.add_collider(collider);
        if let Err(err) = self.world.push_platform(id, Platform::new()) {
            self.world.destroy_body(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Advances the simulation by the provided delta time.
    pub fn step(&mut self, dt: f32) -> usize {
        self.world.step(dt)
    }

    /// Immutable access to a rigidbody by collider id.
    pub fn rigidbody(&self, id: ColliderId) -> Option<&Rigidbody> {
        self.world.rigidbody(id)
    }

    /// Mutable access to a rigidbody by collider id.
    pub fn rigidbody_mut(&mut self, id: ColliderId) -> Option<&mut Rigidbody> {
        self.world.rigidbody_mut(id)
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }
}
