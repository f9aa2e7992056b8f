use super::controller::RayLayout;
use crate::utils::allocator::ColliderId;

/// Static body: indexed and hit by rays, never integrated.
#[derive(Debug, Clone, Default)]
pub struct Platform {
    pub layout: RayLayout,
    pub(crate) collider: ColliderId,
}

impl Platform {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn attach(&mut self, collider: ColliderId) {
        self.collider = collider;
    }

    pub fn collider(&self) -> ColliderId {
        self.collider
    }
}
