//! Collision detection modules: the spatial index, ray queries and contacts.

pub mod contact;
pub mod quadtree;
pub mod queries;

pub use contact::Contact;
pub use quadtree::{NodeId, QuadTree, SpatialPosition};
pub use queries::{Ray, RayHit, RayQuery};
