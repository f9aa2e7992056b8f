use std::cmp::Ordering;

use glam::Vec2;

use crate::{
    core::{collider::Collider, types::Rect},
    utils::{
        allocator::{Arena, ColliderId},
        math::mask_contains,
    },
};

/// Result of a ray cast against a collider rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub collider: ColliderId,
    pub point: Vec2,
    pub normal: Vec2,
    pub distance: f32,
    pub is_trigger: bool,
}

/// Finite ray: `origin + direction * t` for `t in [0, max_distance]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec2,
    pub direction: Vec2,
    pub max_distance: f32,
}

impl Ray {
    pub fn new(origin: Vec2, direction: Vec2, max_distance: f32) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            max_distance: max_distance.max(0.0),
        }
    }

    pub fn end(&self) -> Vec2 {
        self.origin + self.direction * self.max_distance
    }

    /// Bounding rectangle of the segment.
    pub fn bounds(&self) -> Rect {
        let end = self.end();
        Rect::from_min_max(self.origin.min(end), self.origin.max(end))
    }

    /// Tests the ray against a rectangle, producing a hit for `collider`.
    pub fn cast_rect(&self, rect: &Rect, collider: ColliderId, is_trigger: bool) -> Option<RayHit> {
        rect.ray_intersection(self.origin, self.direction, self.max_distance)
            .map(|(distance, normal)| RayHit {
                collider,
                point: self.origin + self.direction * distance,
                normal,
                distance,
                is_trigger,
            })
    }
}

/// Capability to cast a ray into the world and receive hits ordered by distance.
pub trait RayQuery {
    fn query_ray(&self, ray: &Ray, layer_mask: u32) -> Vec<RayHit>;
}

/// Direct scan over every live collider, without spatial acceleration.
impl RayQuery for Arena<Collider> {
    fn query_ray(&self, ray: &Ray, layer_mask: u32) -> Vec<RayHit> {
        let mut hits: Vec<RayHit> = self
            .iter()
            .filter(|(_, collider)| collider.enabled && mask_contains(layer_mask, collider.layer))
            .filter_map(|(id, collider)| ray.cast_rect(&collider.rect(), id, collider.is_trigger))
            .collect();
        sort_hits(&mut hits);
        hits
    }
}

/// Orders hits by ascending distance; equal distances fall back to collider id.
pub fn sort_hits(hits: &mut [RayHit]) {
    hits.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.collider.cmp(&b.collider))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(arena: &mut Arena<Collider>, x: f32, layer: u8, is_trigger: bool) -> ColliderId {
        arena.insert_with(|id| {
            let mut collider = Collider::builder()
                .position(Vec2::new(x, -0.5))
                .layer(layer)
                .is_trigger(is_trigger)
                .build();
            collider.id = id;
            collider
        })
    }

    #[test]
    fn direct_scan_orders_and_filters() {
        let mut colliders = Arena::new();
        let far = boxed(&mut colliders, 8.0, 0, false);
        let near = boxed(&mut colliders, 3.0, 0, true);
        boxed(&mut colliders, 5.0, 2, false);

        let ray = Ray::new(Vec2::ZERO, Vec2::X, 20.0);
        let hits = colliders.query_ray(&ray, 0b1);
        assert_eq!(hits.len(), 2, "layer 2 collider must be filtered out");
        assert_eq!(hits[0].collider, near);
        assert!(hits[0].is_trigger);
        assert_eq!(hits[1].collider, far);
        assert!((hits[0].point.x - 3.0).abs() < 1e-5);
    }

    #[test]
    fn segment_bounds_cover_both_ends() {
        let ray = Ray::new(Vec2::new(2.0, 1.0), Vec2::NEG_X, 3.0);
        let bounds = ray.bounds();
        assert_eq!(bounds.min, Vec2::new(-1.0, 1.0));
        assert_eq!(bounds.max(), Vec2::new(2.0, 1.0));
    }
}
