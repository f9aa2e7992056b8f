//! Ray-sampled sweep that resolves one rigidbody against the world.
//!
//! Each tick the body integrates gravity, casts a fan of rays from the leading
//! edge of its shrunk rectangle along each axis, and clamps its movement to the
//! nearest blocking hit. Rays reach `|movement| + shrink_width`, so a hit is
//! found even when the whole displacement would carry the body past a thin
//! collider in one tick.

use glam::Vec2;
use log::trace;

use super::integrator::Integrator;
use crate::{
    collision::{
        contact::Contact,
        queries::{Ray, RayHit, RayQuery},
    },
    core::{
        collider::Collider,
        rigidbody::{CollisionDetectionMode, Rigidbody},
        types::Direction,
    },
    utils::{allocator::ColliderId, math::zero_nan},
};

/// What one simulate call produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulateOutcome {
    /// Clamped displacement to apply to the body's placement.
    pub movement: Vec2,
    /// Contacts to push into the contact sets, at most one per other collider and kind.
    pub contacts: Vec<Contact>,
}

struct SweepContext<'a> {
    collider: ColliderId,
    is_trigger: bool,
    query: &'a dyn RayQuery,
    max_hits: usize,
}

impl Rigidbody {
    /// Runs gravity, both sweeps and the velocity fix for one tick.
    ///
    /// The caller applies [`SimulateOutcome::movement`] to the collider and
    /// pushes the returned contacts.
    pub fn simulate(
        &mut self,
        integrator: &Integrator,
        collider: &Collider,
        query: &dyn RayQuery,
        dt: f32,
        max_hits: usize,
    ) -> SimulateOutcome {
        integrator.integrate_velocity(self, dt);
        self.movement = integrator.movement(self, dt);

        self.reset_tick_state();
        self.layout.update(&collider.rect());

        let ctx = SweepContext {
            collider: collider.id,
            is_trigger: collider.is_trigger,
            query,
            max_hits,
        };
        let mut contacts = Vec::new();

        self.sweep_horizontal(&ctx, &mut contacts);
        self.sweep_vertical(&ctx, &mut contacts);

        self.movement = zero_nan(self.movement);
        self.fix_velocity();

        SimulateOutcome {
            movement: self.movement,
            contacts,
        }
    }

    fn probe_count(&self, axis_movement: f32) -> usize {
        if axis_movement != 0.0 {
            return 1;
        }
        match self.detection_mode {
            CollisionDetectionMode::WhenMoving => 0,
            CollisionDetectionMode::Continuous => 2,
        }
    }

    fn ray_length(&self, axis_movement: f32) -> f32 {
        let mut length = axis_movement.abs() + self.layout.shrink_width;
        if axis_movement == 0.0 {
            length += self.layout.min_ray_length;
        }
        length
    }

    fn sweep_horizontal(&mut self, ctx: &SweepContext<'_>, contacts: &mut Vec<Contact>) {
        let probes = self.probe_count(self.movement.x);
        let primary = Direction::horizontal(self.movement.x >= 0.0);
        let length = self.ray_length(self.movement.x);
        let step = Vec2::new(0.0, self.layout.horizontal_spacing());
        let count = self.layout.horizontal_ray_count();

        for probe in 0..probes {
            let direction = if probe == 0 { primary } else { primary.opposite() };
            let origins = self.layout.origins();
            let start = match direction {
                Direction::Right => origins.bottom_right,
                _ => origins.bottom_left,
            };
            self.cast_fan(ctx, direction, start, step, count, length, contacts);
        }
    }

    fn sweep_vertical(&mut self, ctx: &SweepContext<'_>, contacts: &mut Vec<Contact>) {
        let probes = self.probe_count(self.movement.y);
        let primary = Direction::vertical(self.movement.y > 0.0);
        let length = self.ray_length(self.movement.y);
        let step = Vec2::new(self.layout.vertical_spacing(), 0.0);
        let count = self.layout.vertical_ray_count();

        for probe in 0..probes {
            let direction = if probe == 0 { primary } else { primary.opposite() };
            let origins = self.layout.origins();
            let corner = match direction {
                Direction::Up => origins.top_left,
                _ => origins.bottom_left,
            };
            // Sample where the body will be after the horizontal resolution.
            let start = corner + Vec2::new(self.movement.x, 0.0);
            self.cast_fan(ctx, direction, start, step, count, length, contacts);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn cast_fan(
        &mut self,
        ctx: &SweepContext<'_>,
        direction: Direction,
        start: Vec2,
        step: Vec2,
        count: u32,
        length: f32,
        contacts: &mut Vec<Contact>,
    ) {
        for i in 0..count {
            let ray = Ray::new(start + step * i as f32, direction.to_vec2(), length);
            let mut hits = ctx.query.query_ray(&ray, self.collision_mask);
            hits.truncate(ctx.max_hits);

            for hit in hits {
                if self.ignored.contains(&hit.collider) {
                    continue;
                }
                self.handle_hit(ctx, &hit, direction, contacts);
            }
        }
    }

    fn handle_hit(
        &mut self,
        ctx: &SweepContext<'_>,
        hit: &RayHit,
        direction: Direction,
        contacts: &mut Vec<Contact>,
    ) {
        let contact = Contact::new(ctx.collider, hit.collider, direction, hit.point);

        if hit.is_trigger || ctx.is_trigger {
            self.trigger = Some(contact);
            if self.seen_triggers.insert(hit.collider) {
                trace!("{} trigger hit {} ({:?})", ctx.collider, hit.collider, direction);
                contacts.push(contact);
            }
            return;
        }

        self.collision.record(contact);
        if self.seen_solids.insert(hit.collider) {
            trace!(
                "{} hit {} ({:?}) at {:.4}",
                ctx.collider,
                hit.collider,
                direction,
                hit.distance
            );
            contacts.push(contact);
        }

        let shrink = self.layout.shrink_width;
        let axis = if direction.is_horizontal() {
            &mut self.movement.x
        } else {
            &mut self.movement.y
        };
        if *axis != 0.0 && (hit.distance - shrink).abs() < axis.abs() {
            *axis = (hit.distance - shrink) * direction.sign();
        }
    }

    fn fix_velocity(&mut self) {
        match self.collision.horizontal_direction() {
            Some(Direction::Left) if self.velocity.x < 0.0 => self.velocity.x = 0.0,
            Some(Direction::Right) if self.velocity.x > 0.0 => self.velocity.x = 0.0,
            _ => {}
        }
        match self.collision.vertical_direction() {
            Some(Direction::Up) if self.velocity.y > 0.0 => self.velocity.y = 0.0,
            Some(Direction::Down) if self.velocity.y < 0.0 => self.velocity.y = 0.0,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::allocator::Arena;
    use approx::assert_relative_eq;

    fn spawn(arena: &mut Arena<Collider>, min: Vec2, size: Vec2, is_trigger: bool) -> ColliderId {
        arena.insert_with(|id| {
            let mut collider = Collider::builder()
                .position(min)
                .size(size)
                .is_trigger(is_trigger)
                .build();
            collider.id = id;
            collider
        })
    }

    fn body_for(id: ColliderId, velocity: Vec2) -> Rigidbody {
        let mut body = Rigidbody::new().with_velocity(velocity);
        body.attach(id);
        body
    }

    fn no_gravity() -> Integrator {
        Integrator::new(Vec2::ZERO)
    }

    #[test]
    fn fast_body_stops_at_thin_wall() {
        let mut arena = Arena::new();
        let me = spawn(&mut arena, Vec2::ZERO, Vec2::ONE, false);
        let wall = spawn(&mut arena, Vec2::new(1.5, -1.0), Vec2::new(0.05, 3.0), false);
        let mut body = body_for(me, Vec2::new(100.0, 0.0));

        let collider = arena.get(me).cloned().expect("collider");
        let outcome = body.simulate(&no_gravity(), &collider, &arena, 0.02, 20);

        assert_relative_eq!(outcome.movement.x, 0.5, epsilon = 1e-5);
        assert_eq!(body.velocity.x, 0.0);
        assert_eq!(body.collision_record().horizontal_direction(), Some(Direction::Right));
        assert_eq!(outcome.contacts.len(), 1, "one contact per collider per tick");
        assert_eq!(outcome.contacts[0].hit_collider, wall);
    }

    #[test]
    fn vertical_rays_start_from_clamped_x() {
        let mut arena = Arena::new();
        let me = spawn(&mut arena, Vec2::new(0.0, 2.0), Vec2::ONE, false);
        let wall = spawn(&mut arena, Vec2::new(1.5, -1.0), Vec2::new(0.5, 5.0), false);
        // Under the body only once it has slid up against the wall.
        let ledge = spawn(&mut arena, Vec2::new(0.95, 1.5), Vec2::new(0.5, 0.2), false);
        let mut body = body_for(me, Vec2::new(50.0, -50.0));

        let collider = arena.get(me).cloned().expect("collider");
        let outcome = body.simulate(&no_gravity(), &collider, &arena, 0.02, 20);

        assert_relative_eq!(outcome.movement.x, 0.5, epsilon = 1e-5);
        assert_relative_eq!(outcome.movement.y, -0.3, epsilon = 1e-5);
        assert_eq!(body.velocity, Vec2::ZERO);
        let record = body.collision_record();
        assert_eq!(record.horizontal.map(|c| c.hit_collider), Some(wall));
        assert_eq!(record.vertical.map(|c| c.hit_collider), Some(ledge));
        assert!(record.is_grounded());
        assert_eq!(outcome.contacts.len(), 2);
    }

    #[test]
    fn nearer_hit_wins_and_record_is_last_write() {
        let mut arena = Arena::new();
        let me = spawn(&mut arena, Vec2::new(0.0, 3.0), Vec2::ONE, false);
        let post = spawn(&mut arena, Vec2::new(0.5, 2.0), Vec2::new(0.3, 0.5), false);
        let floor = spawn(&mut arena, Vec2::new(-1.0, 0.5), Vec2::new(4.0, 1.0), false);
        let mut body = body_for(me, Vec2::new(0.0, -100.0));

        let collider = arena.get(me).cloned().expect("collider");
        let outcome = body.simulate(&no_gravity(), &collider, &arena, 0.02, 20);

        // The floor is met first and the post later; only the post tightens further.
        assert_relative_eq!(outcome.movement.y, -0.5, epsilon = 1e-5);
        assert_eq!(outcome.movement.x, 0.0);
        assert_eq!(body.velocity.y, 0.0);
        let vertical = body.collision_record().vertical.expect("vertical record");
        assert_eq!(vertical.hit_collider, floor);
        assert_eq!(vertical.direction, Some(Direction::Down));
        let hit: Vec<ColliderId> = outcome.contacts.iter().map(|c| c.hit_collider).collect();
        assert_eq!(hit, vec![floor, post]);
    }

    #[test]
    fn trigger_hits_leave_movement_alone() {
        let mut arena = Arena::new();
        let me = spawn(&mut arena, Vec2::ZERO, Vec2::ONE, false);
        let zone = spawn(&mut arena, Vec2::new(1.2, 0.0), Vec2::ONE, true);
        let mut body = body_for(me, Vec2::new(25.0, 0.0));

        let collider = arena.get(me).cloned().expect("collider");
        let outcome = body.simulate(&no_gravity(), &collider, &arena, 0.02, 20);

        assert_relative_eq!(outcome.movement.x, 0.5, epsilon = 1e-6);
        assert_eq!(body.velocity.x, 25.0);
        assert!(!body.collision_record().is_any());
        assert_eq!(body.trigger_record().map(|c| c.hit_collider), Some(zone));
        assert_eq!(outcome.contacts.len(), 1);
    }

    #[test]
    fn resting_body_probes_both_sides_when_continuous() {
        let mut arena = Arena::new();
        let me = spawn(&mut arena, Vec2::ZERO, Vec2::ONE, false);
        let left = spawn(&mut arena, Vec2::new(-1.05, 0.0), Vec2::ONE, false);
        let collider = arena.get(me).cloned().expect("collider");

        let mut lazy = body_for(me, Vec2::ZERO);
        let outcome = lazy.simulate(&no_gravity(), &collider, &arena, 0.02, 20);
        assert!(outcome.contacts.is_empty());

        let mut watchful =
            body_for(me, Vec2::ZERO).with_detection_mode(CollisionDetectionMode::Continuous);
        let outcome = watchful.simulate(&no_gravity(), &collider, &arena, 0.02, 20);
        assert_eq!(outcome.movement, Vec2::ZERO);
        assert_eq!(outcome.contacts.len(), 1);
        assert_eq!(outcome.contacts[0].hit_collider, left);
        assert_eq!(outcome.contacts[0].direction, Some(Direction::Left));
    }

    #[test]
    fn ignored_colliders_are_invisible() {
        let mut arena = Arena::new();
        let me = spawn(&mut arena, Vec2::new(0.0, 2.0), Vec2::ONE, false);
        let floor = spawn(&mut arena, Vec2::ZERO, Vec2::new(4.0, 1.0), false);
        let collider = arena.get(me).cloned().expect("collider");

        let mut body = body_for(me, Vec2::new(0.0, -100.0));
        body.ignore_collider(floor);
        let outcome = body.simulate(&no_gravity(), &collider, &arena, 0.02, 20);

        assert_relative_eq!(outcome.movement.y, -2.0, epsilon = 1e-6);
        assert!(outcome.contacts.is_empty());
    }
}
