//! Configuration constants and the startup settings of a [`PhysicsWorld`](crate::world::PhysicsWorld).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::types::Rect;

/// Default gravity vector applied in the physics world (Y-up).
pub const DEFAULT_GRAVITY: [f32; 2] = [0.0, -9.81];

/// Default fixed timestep (in seconds).
pub const DEFAULT_TIME_STEP: f32 = 0.02;

/// Inward margin applied to a body's rectangle before casting rays.
pub const DEFAULT_SHRINK_WIDTH: f32 = 0.1;

/// Extra ray length used when a body is not moving along an axis.
pub const DEFAULT_MIN_RAY_LENGTH: f32 = 0.1;

/// Rays cast per sweep along each axis.
pub const DEFAULT_RAY_COUNT: u32 = 4;

/// Hits kept per ray; farther hits are dropped.
pub const DEFAULT_MAX_HITS_PER_RAY: usize = 20;

/// Default subdivision depth of the quadtree.
pub const DEFAULT_QUADTREE_DEPTH: u32 = 5;

/// Number of collision layers (one bit each in a `u32` mask).
pub const LAYER_COUNT: usize = 32;

/// Which [`RayQuery`](crate::collision::queries::RayQuery) implementation sweeps use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueryBackend {
    /// Broad-phase through the world's quadtree.
    #[default]
    QuadTree,
    /// Scan every live collider directly.
    Direct,
}

/// Region and depth of the spatial index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadTreeSettings {
    pub world_rect: Rect,
    pub max_depth: u32,
}

impl Default for QuadTreeSettings {
    fn default() -> Self {
        Self {
            world_rect: Rect::from_xywh(0.0, 0.0, 100.0, 100.0),
            max_depth: DEFAULT_QUADTREE_DEPTH,
        }
    }
}

/// Settings supplied once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub gravity: Vec2,
    pub time_step: f32,
    /// Row `i` lists the layers that bodies on layer `i` collide with.
    pub layer_collision_masks: Vec<u32>,
    /// `None` defers index creation to [`PhysicsWorld::create_index`](crate::world::PhysicsWorld::create_index).
    pub quadtree: Option<QuadTreeSettings>,
    pub query_backend: QueryBackend,
    pub max_hits_per_ray: usize,
    /// Warn when a fixed step takes longer than this; `0` disables the check.
    pub frame_budget_ms: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: Vec2::from_array(DEFAULT_GRAVITY),
            time_step: DEFAULT_TIME_STEP,
            layer_collision_masks: vec![u32::MAX; LAYER_COUNT],
            quadtree: Some(QuadTreeSettings::default()),
            query_backend: QueryBackend::default(),
            max_hits_per_ray: DEFAULT_MAX_HITS_PER_RAY,
            frame_budget_ms: 0.0,
        }
    }
}

impl PhysicsSettings {
    /// Mask of layers a body on `layer` casts its rays against.
    pub fn collision_mask(&self, layer: u8) -> u32 {
        self.layer_collision_masks
            .get(usize::from(layer))
            .copied()
            .unwrap_or(u32::MAX)
    }

    /// Enables or disables collisions between two layers, in both directions.
    pub fn set_layer_collision(&mut self, a: u8, b: u8, enabled: bool) {
        let (a, b) = (usize::from(a), usize::from(b));
        if a >= LAYER_COUNT || b >= LAYER_COUNT {
            return;
        }
        if self.layer_collision_masks.len() < LAYER_COUNT {
            self.layer_collision_masks.resize(LAYER_COUNT, u32::MAX);
        }
        for (row, column) in [(a, b), (b, a)] {
            if enabled {
                self.layer_collision_masks[row] |= 1 << column;
            } else {
                self.layer_collision_masks[row] &= !(1 << column);
            }
        }
    }

    /// Fixed step actually used; non-positive values fall back to the default.
    pub fn effective_time_step(&self) -> f32 {
        if self.time_step > 0.0 && self.time_step.is_finite() {
            self.time_step
        } else {
            DEFAULT_TIME_STEP
        }
    }
}
