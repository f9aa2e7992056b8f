use super::{platform::Platform, rigidbody::Rigidbody};
use crate::utils::allocator::ColliderId;

/// A registered participant of the world.
#[derive(Debug)]
pub enum Body {
    Dynamic(Rigidbody),
    Static(Platform),
}

impl Body {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Body::Dynamic(_) => "dynamic",
            Body::Static(_) => "static",
        }
    }

    pub fn collider(&self) -> ColliderId {
        match self {
            Body::Dynamic(body) => body.collider(),
            Body::Static(platform) => platform.collider(),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Body::Dynamic(_))
    }

    pub fn as_rigidbody(&self) -> Option<&Rigidbody> {
        match self {
            Body::Dynamic(body) => Some(body),
            Body::Static(_) => None,
        }
    }

    pub fn as_rigidbody_mut(&mut self) -> Option<&mut Rigidbody> {
        match self {
            Body::Dynamic(body) => Some(body),
            Body::Static(_) => None,
        }
    }

    pub fn as_platform(&self) -> Option<&Platform> {
        match self {
            Body::Static(platform) => Some(platform),
            Body::Dynamic(_) => None,
        }
    }
}
