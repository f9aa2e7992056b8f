//! Core types describing bodies, colliders, and the geometry they share.

pub mod body;
pub mod collider;
pub mod controller;
pub mod platform;
pub mod rigidbody;
pub mod types;

pub use body::Body;
pub use collider::{Collider, ColliderBuilder};
pub use controller::{RayLayout, RaycastOrigins};
pub use platform::Platform;
pub use rigidbody::{CollisionDetectionMode, CollisionRecord, Rigidbody};
pub use types::{Direction, Rect};
