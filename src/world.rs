pub mod contact_manager;
pub mod registry;

use std::time::Instant;

use glam::Vec2;
use log::{debug, trace, warn};

use crate::{
    collision::{
        contact::Contact,
        quadtree::QuadTree,
        queries::{Ray, RayHit, RayQuery},
    },
    config::{PhysicsSettings, QueryBackend},
    core::{
        body::Body, collider::Collider, platform::Platform, rigidbody::Rigidbody, types::Rect,
    },
    dynamics::integrator::Integrator,
    error::{PhysicsError, Result},
    events::{ContactEvent, ContactKind, ContactPhase},
    utils::{
        allocator::{Arena, ColliderId},
        logging::{warn_if_over_budget, PhaseSpan},
        math::mask_contains,
        profiling::{SectionTimer, StepProfiler},
    },
};

pub use contact_manager::ContactManager;
pub use registry::BodyRegistry;

/// Owns every collider, body and contact of one simulation.
///
/// A tick is two phases: [`simulate_all`](Self::simulate_all) moves the
/// rigidbodies and collects contacts, then
/// [`dispatch_contacts`](Self::dispatch_contacts) turns them into enter and
/// exit events. [`step`](Self::step) drives both at the fixed time step.
pub struct PhysicsWorld {
    settings: PhysicsSettings,
    colliders: Arena<Collider>,
    registry: BodyRegistry,
    contacts: ContactManager,
    index: Option<QuadTree>,
    integrator: Integrator,
    time_accumulated: f32,
    tick: u64,
    prune_index: bool,
    warned_missing_index: bool,
    running: bool,
    profiler: StepProfiler,
}

impl PhysicsWorld {
    pub fn new(settings: PhysicsSettings) -> Result<Self> {
        let index = settings
            .quadtree
            .map(|tree| QuadTree::new(tree.world_rect, tree.max_depth))
            .transpose()?;

        Ok(Self {
            integrator: Integrator::new(settings.gravity),
            settings,
            colliders: Arena::new(),
            registry: BodyRegistry::new(),
            contacts: ContactManager::new(),
            index,
            time_accumulated: 0.0,
            tick: 0,
            prune_index: false,
            warned_missing_index: false,
            running: true,
            profiler: StepProfiler::default(),
        })
    }

    /// Builds (or rebuilds) the spatial index and inserts every registered body.
    pub fn create_index(&mut self, world_rect: Rect, max_depth: u32) -> Result<()> {
        let mut tree = QuadTree::new(world_rect, max_depth)?;
        for id in self.registry.ids() {
            if let Some(collider) = self.colliders.get(id).filter(|c| c.enabled) {
                tree.update_item(id, collider.rect(), collider.layer, collider.is_trigger);
            }
        }
        debug!(
            "created quadtree over {:?} (depth {}, {} items)",
            world_rect,
            max_depth,
            tree.len()
        );
        self.index = Some(tree);
        self.prune_index = false;
        self.warned_missing_index = false;
        Ok(())
    }

    pub fn settings(&self) -> &PhysicsSettings {
        &self.settings
    }

    pub fn gravity(&self) -> Vec2 {
        self.integrator.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.settings.gravity = gravity;
        self.integrator.gravity = gravity;
    }

    pub fn add_collider(&mut self, collider: Collider) -> ColliderId {
        self.colliders.insert_with(|id| {
            let mut collider = collider;
            collider.id = id;
            collider
        })
    }

    pub fn push_rigidbody(&mut self, id: ColliderId, mut body: Rigidbody) -> Result<()> {
        let layer = self
            .colliders
            .get(id)
            .map(|collider| collider.layer)
            .ok_or(PhysicsError::UnknownCollider(id))?;

        body.attach(id);
        body.collision_mask = self.settings.collision_mask(layer);
        self.registry.insert_rigidbody(id, body)?;
        self.index_body(id);
        debug!("registered rigidbody {id}");
        Ok(())
    }

    /// Registering the same platform twice is a no-op.
    pub fn push_platform(&mut self, id: ColliderId, mut platform: Platform) -> Result<()> {
        let rect = self
            .colliders
            .get(id)
            .map(Collider::rect)
            .ok_or(PhysicsError::UnknownCollider(id))?;

        platform.attach(id);
        platform.layout.update(&rect);
        if self.registry.insert_platform(id, platform)? {
            self.index_body(id);
            debug!("registered platform {id}");
        }
        Ok(())
    }

    /// Unregisters the rigidbody. Its index entry is pruned on the next tick.
    pub fn remove_rigidbody(&mut self, id: ColliderId) -> Option<Rigidbody> {
        let removed = self.registry.remove_rigidbody(id);
        if removed.is_some() {
            self.prune_index = true;
            debug!("removed rigidbody {id}");
        }
        removed
    }

    /// Unregisters the platform. Its index entry is pruned on the next tick.
    pub fn remove_platform(&mut self, id: ColliderId) -> Option<Platform> {
        let removed = self.registry.remove_platform(id);
        if removed.is_some() {
            self.prune_index = true;
            debug!("removed platform {id}");
        }
        removed
    }

    /// Removes the body and its collider. Contacts involving it exit on the
    /// next dispatch; the destroyed side receives nothing.
    pub fn destroy_body(&mut self, id: ColliderId) -> Option<Body> {
        let body = self.registry.remove(id);
        if let Some(tree) = self.index.as_mut() {
            tree.remove_item(id);
        }
        if self.colliders.remove(id).is_some() {
            debug!("destroyed {id}");
        }
        body
    }

    /// Disabled bodies are neither simulated nor hit by rays.
    pub fn set_body_enabled(&mut self, id: ColliderId, enabled: bool) -> Result<()> {
        let collider = self
            .colliders
            .get_mut(id)
            .ok_or(PhysicsError::UnknownCollider(id))?;
        collider.enabled = enabled;

        if let Some(body) = self.registry.rigidbody_mut(id) {
            body.enabled = enabled;
        }
        if enabled {
            if self.registry.contains(id) {
                self.index_body(id);
            }
        } else if let Some(tree) = self.index.as_mut() {
            tree.remove_item(id);
        }
        Ok(())
    }

    pub fn position(&self, id: ColliderId) -> Option<Vec2> {
        self.colliders.get(id).map(Collider::position)
    }

    pub fn set_position(&mut self, id: ColliderId, position: Vec2) -> Result<()> {
        let collider = self
            .colliders
            .get_mut(id)
            .ok_or(PhysicsError::UnknownCollider(id))?;
        collider.set_position(position);
        self.placement_changed(id);
        Ok(())
    }

    pub fn translate(&mut self, id: ColliderId, delta: Vec2) -> Result<()> {
        let collider = self
            .colliders
            .get_mut(id)
            .ok_or(PhysicsError::UnknownCollider(id))?;
        collider.translate(delta);
        self.placement_changed(id);
        Ok(())
    }

    fn placement_changed(&mut self, id: ColliderId) {
        if !self.registry.contains(id) {
            return;
        }
        if let (Some(Body::Static(platform)), Some(collider)) =
            (self.registry.get_mut(id), self.colliders.get(id))
        {
            platform.layout.update(&collider.rect());
        }
        self.index_body(id);
    }

    fn index_body(&mut self, id: ColliderId) {
        let (Some(tree), Some(collider)) = (self.index.as_mut(), self.colliders.get(id)) else {
            return;
        };
        if collider.enabled {
            tree.update_item(id, collider.rect(), collider.layer, collider.is_trigger);
        }
    }

    /// Queues a contact for the next dispatch.
    pub fn push_collision(&mut self, contact: Contact) {
        let between_rigidbodies = self.registry.is_rigidbody(contact.collider)
            && self.registry.is_rigidbody(contact.hit_collider);
        if self.contacts.push(contact, between_rigidbodies) {
            self.profiler.contacts_pushed += 1;
        }
    }

    /// First phase of a tick: moves every enabled rigidbody in registration order.
    pub fn simulate_all(&mut self, dt: f32) {
        self.tick += 1;
        let _span = PhaseSpan::new("simulate", self.tick);
        let started = Instant::now();
        self.profiler.reset();

        if self.prune_index {
            self.prune_index = false;
            if let Some(tree) = self.index.as_mut() {
                let _index_timer = SectionTimer::new(&mut self.profiler.index_time);
                let registry = &self.registry;
                tree.retain(|id| registry.contains(id));
            }
        }

        let use_index = match (self.settings.query_backend, self.index.is_some()) {
            (QueryBackend::QuadTree, true) => true,
            (QueryBackend::QuadTree, false) => {
                if !self.warned_missing_index {
                    warn!("quadtree backend selected without an index; scanning colliders directly");
                    self.warned_missing_index = true;
                }
                false
            }
            (QueryBackend::Direct, _) => false,
        };
        let max_hits = self.settings.max_hits_per_ray;

        for i in 0..self.registry.len() {
            let Some((id, Body::Dynamic(body))) = self.registry.get_index_mut(i) else {
                continue;
            };
            if !body.enabled {
                continue;
            }
            let Some(collider) = self.colliders.get(id).filter(|c| c.enabled) else {
                continue;
            };

            let query: &dyn RayQuery = match self.index.as_ref() {
                Some(tree) if use_index => tree,
                _ => &self.colliders,
            };
            let outcome = body.simulate(&self.integrator, collider, query, dt, max_hits);
            self.profiler.simulated_bodies += 1;

            if outcome.movement != Vec2::ZERO {
                if let Some(collider) = self.colliders.get_mut(id) {
                    collider.translate(outcome.movement);
                }
            }
            {
                let _index_timer = SectionTimer::new(&mut self.profiler.index_time);
                if let (Some(tree), Some(collider)) = (self.index.as_mut(), self.colliders.get(id)) {
                    tree.update_item(id, collider.rect(), collider.layer, collider.is_trigger);
                }
            }

            for contact in outcome.contacts {
                self.push_collision(contact);
            }
        }

        self.profiler.simulate_time = started.elapsed();
    }

    /// Second phase of a tick: emits enter and exit events, then clears the
    /// per-tick sets. Does nothing after [`shutdown`](Self::shutdown).
    pub fn dispatch_contacts(&mut self) {
        if !self.running {
            self.contacts.discard_pending();
            return;
        }
        let _span = PhaseSpan::new("dispatch", self.tick);
        let started = Instant::now();

        let colliders = &self.colliders;
        let events = self.contacts.resolve(|contact| {
            let a = colliders.get(contact.collider)?;
            let b = colliders.get(contact.hit_collider)?;
            Some(if a.is_trigger || b.is_trigger {
                ContactKind::Trigger
            } else {
                ContactKind::Collision
            })
        });

        for event in events {
            match event.phase {
                ContactPhase::Enter => self.profiler.enter_events += 1,
                ContactPhase::Exit => self.profiler.exit_events += 1,
            }
            self.deliver(&event);
        }

        self.profiler.dispatch_time = started.elapsed();
    }

    fn deliver(&mut self, event: &ContactEvent) {
        let ContactEvent {
            kind,
            phase,
            contact,
        } = *event;
        trace!("{kind:?} {phase:?}: {} / {}", contact.collider, contact.hit_collider);

        for seen in [contact, contact.swapped()] {
            if !self.colliders.contains(seen.collider) {
                continue;
            }
            match self.registry.get_mut(seen.collider) {
                Some(Body::Dynamic(body)) => body.events.emit(kind, phase, &seen),
                Some(Body::Static(_)) => {
                    trace!("platform {} {kind:?} {phase:?} with {}", seen.collider, seen.hit_collider)
                }
                None => {}
            }
        }
    }

    /// Runs as many fixed steps as `dt` covers. Returns the number of steps run.
    /// A negative or non-finite `dt` is ignored.
    pub fn step(&mut self, dt: f32) -> usize {
        if !dt.is_finite() || dt < 0.0 {
            warn!("ignoring step with dt = {dt}");
            return 0;
        }
        let time_step = self.settings.effective_time_step();
        self.time_accumulated += dt;

        let mut steps = 0;
        while self.time_accumulated >= time_step {
            self.time_accumulated -= time_step;
            let started = Instant::now();

            self.simulate_all(time_step);
            self.dispatch_contacts();

            warn_if_over_budget(
                self.tick,
                self.profiler.simulated_bodies,
                started.elapsed(),
                self.settings.frame_budget_ms,
            );
            self.profiler.report();
            steps += 1;
        }
        steps
    }

    /// Stops event dispatch for good; simulation keeps working.
    pub fn shutdown(&mut self) {
        if self.running {
            debug!("physics world shut down");
        }
        self.running = false;
        self.contacts.clear();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of simulate phases run so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Casts a ray through the configured provider, hits ordered by distance.
    pub fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32, layer_mask: u32) -> Vec<RayHit> {
        let ray = Ray::new(origin, direction, max_distance);
        let mut hits = match (self.settings.query_backend, self.index.as_ref()) {
            (QueryBackend::QuadTree, Some(tree)) => tree.query_ray(&ray, layer_mask),
            _ => self.colliders.query_ray(&ray, layer_mask),
        };
        hits.truncate(self.settings.max_hits_per_ray);
        hits
    }

    /// Colliders overlapping `region`, in ascending id order.
    pub fn query_region(&self, region: &Rect, layer_mask: u32) -> Vec<ColliderId> {
        match (self.settings.query_backend, self.index.as_ref()) {
            (QueryBackend::QuadTree, Some(tree)) => tree.query_region(region, layer_mask),
            _ => {
                let mut ids: Vec<ColliderId> = self
                    .colliders
                    .iter()
                    .filter(|(_, c)| c.enabled && mask_contains(layer_mask, c.layer))
                    .filter(|(_, c)| c.rect().overlaps(region))
                    .map(|(id, _)| id)
                    .collect();
                ids.sort();
                ids
            }
        }
    }

    /// Contacts that have entered and not yet exited.
    pub fn active_contacts(&self) -> impl Iterator<Item = &Contact> + '_ {
        self.contacts.active()
    }

    pub fn profiler(&self) -> &StepProfiler {
        &self.profiler
    }

    pub fn index(&self) -> Option<&QuadTree> {
        self.index.as_ref()
    }

    pub fn colliders(&self) -> &Arena<Collider> {
        &self.colliders
    }

    pub fn collider(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.get(id)
    }

    pub fn body(&self, id: ColliderId) -> Option<&Body> {
        self.registry.get(id)
    }

    pub fn rigidbody(&self, id: ColliderId) -> Option<&Rigidbody> {
        self.registry.rigidbody(id)
    }

    pub fn rigidbody_mut(&mut self, id: ColliderId) -> Option<&mut Rigidbody> {
        self.registry.rigidbody_mut(id)
    }

    pub fn platform(&self, id: ColliderId) -> Option<&Platform> {
        self.registry.platform(id)
    }

    pub fn body_count(&self) -> usize {
        self.registry.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuadTreeSettings;

    fn settings() -> PhysicsSettings {
        PhysicsSettings {
            gravity: Vec2::ZERO,
            quadtree: Some(QuadTreeSettings {
                world_rect: Rect::from_xywh(0.0, 0.0, 64.0, 64.0),
                max_depth: 4,
            }),
            ..PhysicsSettings::default()
        }
    }

    fn boxed(world: &mut PhysicsWorld, x: f32, y: f32) -> ColliderId {
        world.add_collider(Collider::builder().position(Vec2::new(x, y)).build())
    }

    #[test]
    fn registration_indexes_immediately() {
        let mut world = PhysicsWorld::new(settings()).expect("world");
        let id = boxed(&mut world, 4.0, 4.0);
        world.push_platform(id, Platform::new()).expect("platform");
        world.push_platform(id, Platform::new()).expect("second push is a no-op");

        let tree = world.index().expect("index");
        assert!(tree.contains(id));
        assert_eq!(tree.len(), 1);
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn removed_bodies_leave_the_index_on_next_tick() {
        let mut world = PhysicsWorld::new(settings()).expect("world");
        let id = boxed(&mut world, 4.0, 4.0);
        world.push_rigidbody(id, Rigidbody::new()).expect("rigidbody");

        assert!(world.remove_rigidbody(id).is_some());
        assert!(world.index().is_some_and(|tree| tree.contains(id)));
        world.simulate_all(0.02);
        assert!(!world.index().is_some_and(|tree| tree.contains(id)));
        assert!(world.collider(id).is_some(), "collider outlives registration");
    }

    #[test]
    fn unknown_collider_is_rejected() {
        let mut world = PhysicsWorld::new(settings()).expect("world");
        let id = boxed(&mut world, 1.0, 1.0);
        world.destroy_body(id);
        assert_eq!(
            world.push_rigidbody(id, Rigidbody::new()),
            Err(PhysicsError::UnknownCollider(id))
        );
    }

    #[test]
    fn deferred_index_picks_up_existing_bodies() {
        let mut world = PhysicsWorld::new(PhysicsSettings {
            quadtree: None,
            ..settings()
        })
        .expect("world");
        let id = boxed(&mut world, 10.0, 10.0);
        world.push_platform(id, Platform::new()).expect("platform");
        assert!(world.index().is_none());

        world
            .create_index(Rect::from_xywh(0.0, 0.0, 32.0, 32.0), 3)
            .expect("index");
        assert!(world.index().is_some_and(|tree| tree.contains(id)));
    }

    #[test]
    fn disabled_bodies_are_invisible() {
        let mut world = PhysicsWorld::new(settings()).expect("world");
        let id = boxed(&mut world, 10.0, 0.0);
        world.push_platform(id, Platform::new()).expect("platform");

        assert_eq!(world.raycast(Vec2::new(0.0, 0.5), Vec2::X, 20.0, u32::MAX).len(), 1);
        world.set_body_enabled(id, false).expect("disable");
        assert!(world.raycast(Vec2::new(0.0, 0.5), Vec2::X, 20.0, u32::MAX).is_empty());
        world.set_body_enabled(id, true).expect("enable");
        assert_eq!(world.query_region(&Rect::from_xywh(9.0, 0.0, 2.0, 2.0), u32::MAX), vec![id]);
    }
}
