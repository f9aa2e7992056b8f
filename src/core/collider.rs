use super::types::Rect;
use crate::utils::allocator::ColliderId;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box collider attached to a body's placement.
///
/// The world rectangle is `position + offset` (minimum corner) by `size` and is
/// kept in sync by every setter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collider {
    pub id: ColliderId,
    position: Vec2,
    offset: Vec2,
    size: Vec2,
    rect: Rect,
    pub is_trigger: bool,
    /// Layer index in `0..32`, tested against ray layer masks.
    pub layer: u8,
    /// Disabled colliders are invisible to rays.
    pub enabled: bool,
}

impl Default for Collider {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Collider {
    pub fn builder() -> ColliderBuilder {
        ColliderBuilder::new()
    }

    /// Placement of the owning body.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.refresh();
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
        self.refresh();
    }

    /// Reconfigures the local box; the owning placement is kept.
    pub fn set_shape(&mut self, offset: Vec2, size: Vec2) {
        self.offset = offset;
        self.size = size.max(Vec2::ZERO);
        self.refresh();
    }

    fn refresh(&mut self) {
        self.rect = Rect::new(self.position + self.offset, self.size);
    }
}

pub struct ColliderBuilder {
    position: Vec2,
    offset: Vec2,
    size: Vec2,
    is_trigger: bool,
    layer: u8,
}

impl Default for ColliderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ColliderBuilder {
    pub fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            offset: Vec2::ZERO,
            size: Vec2::ONE,
            is_trigger: false,
            layer: 0,
        }
    }

    pub fn position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    pub fn is_trigger(mut self, is_trigger: bool) -> Self {
        self.is_trigger = is_trigger;
        self
    }

    pub fn layer(mut self, layer: u8) -> Self {
        self.layer = layer.min(31);
        self
    }

    pub fn build(self) -> Collider {
        let mut collider = Collider {
            id: ColliderId::NULL,
            position: self.position,
            offset: self.offset,
            size: self.size.max(Vec2::ZERO),
            rect: Rect::default(),
            is_trigger: self.is_trigger,
            layer: self.layer,
            enabled: true,
        };
        collider.refresh();
        collider
    }
}
