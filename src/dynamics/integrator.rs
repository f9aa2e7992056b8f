use glam::Vec2;

use crate::{core::rigidbody::Rigidbody, utils::math::zero_nan};

/// Explicit Euler integration of gravity into rigidbody velocity.
#[derive(Debug, Clone, Copy)]
pub struct Integrator {
    pub gravity: Vec2,
}

impl Integrator {
    pub fn new(gravity: Vec2) -> Self {
        Self { gravity }
    }

    pub fn integrate_velocity(&self, body: &mut Rigidbody, dt: f32) {
        body.velocity += self.gravity * (body.gravity_scale * dt);
    }

    /// Desired displacement for this tick; NaN components become zero.
    pub fn movement(&self, body: &Rigidbody, dt: f32) -> Vec2 {
        zero_nan(body.velocity * dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn gravity_scales_with_body_and_dt() {
        let integrator = Integrator::new(Vec2::new(0.0, -10.0));
        let mut body = Rigidbody::new().with_gravity_scale(0.5);
        integrator.integrate_velocity(&mut body, 0.02);

        assert_relative_eq!(body.velocity.y, -0.1, epsilon = 1e-6);
        assert_relative_eq!(integrator.movement(&body, 0.02).y, -0.002, epsilon = 1e-7);
    }

    #[test]
    fn nan_velocity_does_not_move() {
        let integrator = Integrator::new(Vec2::ZERO);
        let body = Rigidbody::new().with_velocity(Vec2::new(f32::NAN, 1.0));
        assert_eq!(integrator.movement(&body, 1.0), Vec2::new(0.0, 1.0));
    }
}
