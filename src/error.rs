//! Error type shared by the registration API and the geometry helpers.

use glam::Vec2;
use thiserror::Error;

use crate::utils::allocator::ColliderId;

/// Failures surfaced to the caller. None of them are retried internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// The collider already has a rigidbody registered for it.
    #[error("{0} already has a registered rigidbody")]
    DuplicateRigidbody(ColliderId),
    /// The collider is registered as the other kind of body.
    #[error("{id} is already registered as a {existing} body")]
    BodyKindConflict {
        id: ColliderId,
        existing: &'static str,
    },
    /// The handle does not resolve to a live collider.
    #[error("{0} does not refer to a live collider")]
    UnknownCollider(ColliderId),
    /// A vector that is not one of the four unit axes was used as a direction.
    #[error("vector ({}, {}) is not an axis-aligned unit direction", .0.x, .0.y)]
    InvalidDirection(Vec2),
    /// The spatial index cannot be built over the given region.
    #[error("invalid quadtree: {0}")]
    InvalidQuadTree(String),
}

pub type Result<T> = std::result::Result<T, PhysicsError>;
