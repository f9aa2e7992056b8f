//! Contact event channels and a polling recorder built on top of them.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::collision::contact::Contact;

/// Handle returned by [`EventChannel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&Contact) + Send>;

/// Ordered list of observers for one kind of contact event.
///
/// Handlers run in subscription order. A handler that is unsubscribed never
/// runs again.
#[derive(Default)]
pub struct EventChannel {
    handlers: Vec<(SubscriptionId, Handler)>,
    next_id: u64,
}

impl fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&Contact) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(existing, _)| *existing != id);
        self.handlers.len() != before
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn emit(&mut self, contact: &Contact) {
        for (_, handler) in self.handlers.iter_mut() {
            handler(contact);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactKind {
    Collision,
    Trigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactPhase {
    Enter,
    Exit,
}

/// The four channels every rigidbody exposes.
#[derive(Debug, Default)]
pub struct ContactEvents {
    pub collision_enter: EventChannel,
    pub collision_exit: EventChannel,
    pub trigger_enter: EventChannel,
    pub trigger_exit: EventChannel,
}

impl ContactEvents {
    pub fn channel_mut(&mut self, kind: ContactKind, phase: ContactPhase) -> &mut EventChannel {
        match (kind, phase) {
            (ContactKind::Collision, ContactPhase::Enter) => &mut self.collision_enter,
            (ContactKind::Collision, ContactPhase::Exit) => &mut self.collision_exit,
            (ContactKind::Trigger, ContactPhase::Enter) => &mut self.trigger_enter,
            (ContactKind::Trigger, ContactPhase::Exit) => &mut self.trigger_exit,
        }
    }

    pub fn emit(&mut self, kind: ContactKind, phase: ContactPhase, contact: &Contact) {
        self.channel_mut(kind, phase).emit(contact);
    }

    pub fn clear(&mut self) {
        self.collision_enter.clear();
        self.collision_exit.clear();
        self.trigger_enter.clear();
        self.trigger_exit.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.collision_enter.len()
            + self.collision_exit.len()
            + self.trigger_enter.len()
            + self.trigger_exit.len()
    }
}

/// A classified contact event, as dispatched and as recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactEvent {
    pub kind: ContactKind,
    pub phase: ContactPhase,
    pub contact: Contact,
}

/// Shared sink that collects every event of the bodies it is attached to.
///
/// Clones share the same buffer, so a clone can be attached to several bodies
/// while another is kept for [`drain`](Self::drain).
#[derive(Debug, Clone, Default)]
pub struct ContactRecorder {
    entries: Arc<Mutex<Vec<ContactEvent>>>,
}

impl ContactRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to all four channels of `events`.
    pub fn attach(&self, events: &mut ContactEvents) -> [SubscriptionId; 4] {
        let phases = [
            (ContactKind::Collision, ContactPhase::Enter),
            (ContactKind::Collision, ContactPhase::Exit),
            (ContactKind::Trigger, ContactPhase::Enter),
            (ContactKind::Trigger, ContactPhase::Exit),
        ];
        phases.map(|(kind, phase)| {
            let entries = Arc::clone(&self.entries);
            events.channel_mut(kind, phase).subscribe(move |contact| {
                entries.lock().push(ContactEvent {
                    kind,
                    phase,
                    contact: *contact,
                });
            })
        })
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<ContactEvent> {
        self.entries.lock().clone()
    }

    pub fn drain(&self) -> Vec<ContactEvent> {
        std::mem::take(&mut *self.entries.lock())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
