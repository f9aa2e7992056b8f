//! Utility helpers: the collider arena, math extensions, logging and profiling.

pub mod allocator;
pub mod logging;
pub mod math;
pub mod profiling;

pub use allocator::{Arena, ColliderId};
pub use math::*;
