use indexmap::IndexMap;

use crate::{
    core::{body::Body, platform::Platform, rigidbody::Rigidbody},
    error::{PhysicsError, Result},
    utils::allocator::ColliderId,
};

/// Collider id to body, in registration order.
#[derive(Debug, Default)]
pub struct BodyRegistry {
    bodies: IndexMap<ColliderId, Body>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_rigidbody(&mut self, id: ColliderId, body: Rigidbody) -> Result<()> {
        match self.bodies.get(&id) {
            Some(Body::Dynamic(_)) => Err(PhysicsError::DuplicateRigidbody(id)),
            Some(existing) => Err(PhysicsError::BodyKindConflict {
                id,
                existing: existing.kind_name(),
            }),
            None => {
                self.bodies.insert(id, Body::Dynamic(body));
                Ok(())
            }
        }
    }

    /// Returns `Ok(false)` when the collider already has a platform.
    pub fn insert_platform(&mut self, id: ColliderId, platform: Platform) -> Result<bool> {
        match self.bodies.get(&id) {
            Some(Body::Static(_)) => Ok(false),
            Some(existing) => Err(PhysicsError::BodyKindConflict {
                id,
                existing: existing.kind_name(),
            }),
            None => {
                self.bodies.insert(id, Body::Static(platform));
                Ok(true)
            }
        }
    }

    pub fn remove(&mut self, id: ColliderId) -> Option<Body> {
        self.bodies.shift_remove(&id)
    }

    pub fn remove_rigidbody(&mut self, id: ColliderId) -> Option<Rigidbody> {
        if !self.is_rigidbody(id) {
            return None;
        }
        match self.bodies.shift_remove(&id) {
            Some(Body::Dynamic(body)) => Some(body),
            _ => None,
        }
    }

    pub fn remove_platform(&mut self, id: ColliderId) -> Option<Platform> {
        if !matches!(self.bodies.get(&id), Some(Body::Static(_))) {
            return None;
        }
        match self.bodies.shift_remove(&id) {
            Some(Body::Static(platform)) => Some(platform),
            _ => None,
        }
    }

    pub fn get(&self, id: ColliderId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn get_mut(&mut self, id: ColliderId) -> Option<&mut Body> {
        self.bodies.get_mut(&id)
    }

    pub fn get_index_mut(&mut self, index: usize) -> Option<(ColliderId, &mut Body)> {
        self.bodies
            .get_index_mut(index)
            .map(|(id, body)| (*id, body))
    }

    pub fn rigidbody(&self, id: ColliderId) -> Option<&Rigidbody> {
        self.get(id).and_then(Body::as_rigidbody)
    }

    pub fn rigidbody_mut(&mut self, id: ColliderId) -> Option<&mut Rigidbody> {
        self.get_mut(id).and_then(Body::as_rigidbody_mut)
    }

    pub fn platform(&self, id: ColliderId) -> Option<&Platform> {
        self.get(id).and_then(Body::as_platform)
    }

    pub fn is_rigidbody(&self, id: ColliderId) -> bool {
        matches!(self.bodies.get(&id), Some(Body::Dynamic(_)))
    }

    pub fn contains(&self, id: ColliderId) -> bool {
        self.bodies.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = ColliderId> + '_ {
        self.bodies.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColliderId, &Body)> + '_ {
        self.bodies.iter().map(|(id, body)| (*id, body))
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
