use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{controller::RayLayout, types::Direction};
use crate::{
    collision::contact::Contact,
    events::{ContactEvents, ContactRecorder, SubscriptionId},
    utils::allocator::ColliderId,
};

/// When the horizontal and vertical sweeps run for an axis without movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionDetectionMode {
    /// Skip the sweep on an axis with zero movement.
    #[default]
    WhenMoving,
    /// Probe both directions of an axis with zero movement.
    Continuous,
}

/// Last solid contact per axis during the current tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollisionRecord {
    pub horizontal: Option<Contact>,
    pub vertical: Option<Contact>,
}

impl CollisionRecord {
    pub fn reset(&mut self) {
        self.horizontal = None;
        self.vertical = None;
    }

    pub fn record(&mut self, contact: Contact) {
        match contact.direction {
            Some(direction) if direction.is_horizontal() => self.horizontal = Some(contact),
            Some(_) => self.vertical = Some(contact),
            None => {}
        }
    }

    pub fn horizontal_direction(&self) -> Option<Direction> {
        self.horizontal.and_then(|contact| contact.direction)
    }

    pub fn vertical_direction(&self) -> Option<Direction> {
        self.vertical.and_then(|contact| contact.direction)
    }

    pub fn is_grounded(&self) -> bool {
        self.vertical_direction() == Some(Direction::Down)
    }

    pub fn is_any(&self) -> bool {
        self.horizontal.is_some() || self.vertical.is_some()
    }
}

/// Dynamic body moved by gravity, velocity and the raycast sweep.
#[derive(Debug)]
pub struct Rigidbody {
    pub velocity: Vec2,
    pub gravity_scale: f32,
    pub detection_mode: CollisionDetectionMode,
    pub layout: RayLayout,
    /// Layers this body's rays see. Filled from the layer matrix on registration.
    pub collision_mask: u32,
    pub enabled: bool,
    pub events: ContactEvents,

    pub(crate) collider: ColliderId,
    pub(crate) movement: Vec2,
    pub(crate) collision: CollisionRecord,
    pub(crate) trigger: Option<Contact>,
    pub(crate) ignored: HashSet<ColliderId>,
    pub(crate) seen_triggers: HashSet<ColliderId>,
    pub(crate) seen_solids: HashSet<ColliderId>,
}

impl Default for Rigidbody {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
            detection_mode: CollisionDetectionMode::default(),
            layout: RayLayout::default(),
            collision_mask: u32::MAX,
            enabled: true,
            events: ContactEvents::default(),
            collider: ColliderId::NULL,
            movement: Vec2::ZERO,
            collision: CollisionRecord::default(),
            trigger: None,
            ignored: HashSet::new(),
            seen_triggers: HashSet::new(),
            seen_solids: HashSet::new(),
        }
    }
}

impl Rigidbody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_gravity_scale(mut self, gravity_scale: f32) -> Self {
        self.gravity_scale = gravity_scale;
        self
    }

    pub fn with_detection_mode(mut self, mode: CollisionDetectionMode) -> Self {
        self.detection_mode = mode;
        self
    }

    /// Binds the body to its collider, which it always ignores.
    pub(crate) fn attach(&mut self, collider: ColliderId) {
        if !self.collider.is_null() {
            self.ignored.remove(&self.collider);
        }
        self.collider = collider;
        self.ignored.insert(collider);
    }

    pub fn collider(&self) -> ColliderId {
        self.collider
    }

    /// Movement applied during the most recent tick, after clamping.
    pub fn movement(&self) -> Vec2 {
        self.movement
    }

    pub fn collision_record(&self) -> &CollisionRecord {
        &self.collision
    }

    pub fn trigger_record(&self) -> Option<&Contact> {
        self.trigger.as_ref()
    }

    pub fn ignore_collider(&mut self, id: ColliderId) {
        self.ignored.insert(id);
    }

    /// The body's own collider stays ignored.
    pub fn unignore_collider(&mut self, id: ColliderId) -> bool {
        if id == self.collider {
            return false;
        }
        self.ignored.remove(&id)
    }

    pub fn is_ignoring(&self, id: ColliderId) -> bool {
        self.ignored.contains(&id)
    }

    /// Routes every event of this body into `recorder`.
    pub fn record_into(&mut self, recorder: &ContactRecorder) -> [SubscriptionId; 4] {
        recorder.attach(&mut self.events)
    }

    pub(crate) fn reset_tick_state(&mut self) {
        self.collision.reset();
        self.trigger = None;
        self.seen_triggers.clear();
        self.seen_solids.clear();
        self.layout.reset();
    }
}
