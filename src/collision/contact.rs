use std::hash::{Hash, Hasher};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{core::types::Direction, utils::allocator::ColliderId};

/// A touching pair of colliders, seen from `collider`.
///
/// Identity is the unordered pair: `(A, B)` and `(B, A)` compare equal and
/// hash the same, whatever their direction or point. A contact discovered by
/// both participants' sweeps therefore collapses to a single set entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Contact {
    pub collider: ColliderId,
    pub hit_collider: ColliderId,
    pub direction: Option<Direction>,
    pub point: Vec2,
}

impl Default for Contact {
    fn default() -> Self {
        Self {
            collider: ColliderId::NULL,
            hit_collider: ColliderId::NULL,
            direction: None,
            point: Vec2::ZERO,
        }
    }
}

impl Contact {
    pub fn new(
        collider: ColliderId,
        hit_collider: ColliderId,
        direction: Direction,
        point: Vec2,
    ) -> Self {
        Self {
            collider,
            hit_collider,
            direction: Some(direction),
            point,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The same contact as seen from `hit_collider`.
    pub fn swapped(&self) -> Self {
        Self {
            collider: self.hit_collider,
            hit_collider: self.collider,
            direction: self.direction.map(Direction::opposite),
            point: self.point,
        }
    }

    fn ordered_pair(&self) -> (ColliderId, ColliderId) {
        if self.collider <= self.hit_collider {
            (self.collider, self.hit_collider)
        } else {
            (self.hit_collider, self.collider)
        }
    }
}

impl PartialEq for Contact {
    fn eq(&self, other: &Self) -> bool {
        (self.collider == other.collider && self.hit_collider == other.hit_collider)
            || (self.collider == other.hit_collider && self.hit_collider == other.collider)
    }
}

impl Eq for Contact {}

impl Hash for Contact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordered_pair().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    #[test]
    fn pair_identity_is_symmetric() {
        let hasher = RandomState::new();
        let ids: Vec<ColliderId> = (0..4).map(|i| ColliderId::new(i, i % 2)).collect();

        for a in &ids {
            for b in &ids {
                if a == b {
                    continue;
                }
                let ab = Contact::new(*a, *b, Direction::Left, Vec2::ZERO);
                let ba = Contact::new(*b, *a, Direction::Up, Vec2::ONE);
                assert_eq!(ab, ba);
                assert_eq!(hasher.hash_one(ab), hasher.hash_one(ba));
            }
        }
    }

    #[test]
    fn swap_flips_perspective() {
        let a = ColliderId::new(0, 0);
        let b = ColliderId::new(1, 0);
        let contact = Contact::new(a, b, Direction::Down, Vec2::new(1.0, 2.0));
        let swapped = contact.swapped();
        assert_eq!(swapped.collider, b);
        assert_eq!(swapped.hit_collider, a);
        assert_eq!(swapped.direction, Some(Direction::Up));
        assert_eq!(swapped.point, contact.point);
    }

    #[test]
    fn reset_clears_everything() {
        let mut contact = Contact::new(
            ColliderId::new(2, 0),
            ColliderId::new(3, 0),
            Direction::Right,
            Vec2::ONE,
        );
        contact.reset();
        assert!(contact.collider.is_null());
        assert!(contact.hit_collider.is_null());
        assert_eq!(contact.direction, None);
    }
}
