//! Raycast geometry shared by every body that takes part in the sweep model.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::types::Rect;
use crate::config::{DEFAULT_MIN_RAY_LENGTH, DEFAULT_RAY_COUNT, DEFAULT_SHRINK_WIDTH};

/// Corners of the shrunk body rectangle that rays are cast from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RaycastOrigins {
    pub top_left: Vec2,
    pub top_right: Vec2,
    pub bottom_left: Vec2,
    pub bottom_right: Vec2,
}

impl RaycastOrigins {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Ray counts, margins and the cached origins of one body.
///
/// Horizontal rays are spread along the height of the shrunk rectangle,
/// vertical rays along its width. Both counts are at least two so the two
/// corners of the leading edge are always sampled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RayLayout {
    pub shrink_width: f32,
    pub min_ray_length: f32,
    horizontal_ray_count: u32,
    vertical_ray_count: u32,
    horizontal_spacing: f32,
    vertical_spacing: f32,
    origins: RaycastOrigins,
}

impl Default for RayLayout {
    fn default() -> Self {
        Self::new(DEFAULT_RAY_COUNT, DEFAULT_RAY_COUNT)
    }
}

impl RayLayout {
    pub fn new(horizontal_ray_count: u32, vertical_ray_count: u32) -> Self {
        Self {
            shrink_width: DEFAULT_SHRINK_WIDTH,
            min_ray_length: DEFAULT_MIN_RAY_LENGTH,
            horizontal_ray_count: horizontal_ray_count.max(2),
            vertical_ray_count: vertical_ray_count.max(2),
            horizontal_spacing: 0.0,
            vertical_spacing: 0.0,
            origins: RaycastOrigins::default(),
        }
    }

    pub fn set_ray_counts(&mut self, horizontal: u32, vertical: u32) {
        self.horizontal_ray_count = horizontal.max(2);
        self.vertical_ray_count = vertical.max(2);
    }

    pub fn horizontal_ray_count(&self) -> u32 {
        self.horizontal_ray_count
    }

    pub fn vertical_ray_count(&self) -> u32 {
        self.vertical_ray_count
    }

    pub fn horizontal_spacing(&self) -> f32 {
        self.horizontal_spacing
    }

    pub fn vertical_spacing(&self) -> f32 {
        self.vertical_spacing
    }

    pub fn origins(&self) -> &RaycastOrigins {
        &self.origins
    }

    /// `rect` pulled in by the shrink width on every side.
    pub fn shrunk(&self, rect: &Rect) -> Rect {
        rect.expanded(-self.shrink_width)
    }

    /// Recomputes origins and spacing from the body's current rectangle.
    pub fn update(&mut self, rect: &Rect) {
        let bounds = self.shrunk(rect);
        let min = bounds.min;
        let max = bounds.max();

        self.horizontal_spacing = bounds.height() / (self.horizontal_ray_count - 1) as f32;
        self.vertical_spacing = bounds.width() / (self.vertical_ray_count - 1) as f32;

        self.origins = RaycastOrigins {
            top_left: Vec2::new(min.x, max.y),
            top_right: max,
            bottom_left: min,
            bottom_right: Vec2::new(max.x, min.y),
        };
    }

    pub fn reset(&mut self) {
        self.origins.reset();
        self.horizontal_spacing = 0.0;
        self.vertical_spacing = 0.0;
    }
}
