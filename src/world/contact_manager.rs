use indexmap::{IndexMap, IndexSet};

use crate::{
    collision::contact::Contact,
    events::{ContactEvent, ContactKind, ContactPhase},
};

/// Per-tick contact sets and the settled baseline they are diffed against.
///
/// Pairs of two rigidbodies are kept apart from pairs involving a static or
/// unregistered collider; both groups follow the same enter/exit rules. A pair
/// whose group changes while it is active carries its baseline entry along, so
/// it neither re-enters nor exits. The baseline remembers the kind each contact entered with so its exit is
/// reported on the matching channel even after a participant is gone.
#[derive(Debug, Default)]
pub struct ContactManager {
    last_colliders: IndexMap<Contact, ContactKind>,
    last_rigidbodies: IndexMap<Contact, ContactKind>,
    current_colliders: IndexSet<Contact>,
    current_rigidbodies: IndexSet<Contact>,
}

impl ContactManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the pair was already pushed this tick, in either group.
    pub fn push(&mut self, contact: Contact, between_rigidbodies: bool) -> bool {
        let (current, other) = if between_rigidbodies {
            (&mut self.current_rigidbodies, &self.current_colliders)
        } else {
            (&mut self.current_colliders, &self.current_rigidbodies)
        };
        !other.contains(&contact) && current.insert(contact)
    }

    /// Diffs the current sets against the baseline and clears them.
    ///
    /// `classify` returns `None` when a participant no longer exists. Such
    /// contacts never enter, and leave the baseline with an exit.
    pub fn resolve(
        &mut self,
        mut classify: impl FnMut(&Contact) -> Option<ContactKind>,
    ) -> Vec<ContactEvent> {
        let mut events = Vec::new();

        Self::regroup(&self.current_colliders, &mut self.last_rigidbodies, &mut self.last_colliders);
        Self::regroup(&self.current_rigidbodies, &mut self.last_colliders, &mut self.last_rigidbodies);

        Self::enter(&self.current_colliders, &mut self.last_colliders, &mut classify, &mut events);
        Self::enter(
            &self.current_rigidbodies,
            &mut self.last_rigidbodies,
            &mut classify,
            &mut events,
        );
        Self::exit(&self.current_colliders, &mut self.last_colliders, &mut classify, &mut events);
        Self::exit(
            &self.current_rigidbodies,
            &mut self.last_rigidbodies,
            &mut classify,
            &mut events,
        );

        self.current_colliders.clear();
        self.current_rigidbodies.clear();
        events
    }

    /// Moves baseline entries of pairs pushed into the other group this tick.
    fn regroup(
        current: &IndexSet<Contact>,
        from: &mut IndexMap<Contact, ContactKind>,
        to: &mut IndexMap<Contact, ContactKind>,
    ) {
        if from.is_empty() {
            return;
        }
        for contact in current {
            if let Some((stored, kind)) = from.shift_remove_entry(contact) {
                to.insert(stored, kind);
            }
        }
    }

    fn enter(
        current: &IndexSet<Contact>,
        last: &mut IndexMap<Contact, ContactKind>,
        classify: &mut impl FnMut(&Contact) -> Option<ContactKind>,
        events: &mut Vec<ContactEvent>,
    ) {
        for contact in current {
            if last.contains_key(contact) {
                continue;
            }
            let Some(kind) = classify(contact) else {
                continue;
            };
            last.insert(*contact, kind);
            events.push(ContactEvent {
                kind,
                phase: ContactPhase::Enter,
                contact: *contact,
            });
        }
    }

    fn exit(
        current: &IndexSet<Contact>,
        last: &mut IndexMap<Contact, ContactKind>,
        classify: &mut impl FnMut(&Contact) -> Option<ContactKind>,
        events: &mut Vec<ContactEvent>,
    ) {
        last.retain(|contact, kind| {
            let alive = current.contains(contact) && classify(contact).is_some();
            if !alive {
                events.push(ContactEvent {
                    kind: *kind,
                    phase: ContactPhase::Exit,
                    contact: *contact,
                });
            }
            alive
        });
    }

    /// Contacts that have entered and not yet exited.
    pub fn active(&self) -> impl Iterator<Item = &Contact> + '_ {
        self.last_colliders.keys().chain(self.last_rigidbodies.keys())
    }

    pub fn active_len(&self) -> usize {
        self.last_colliders.len() + self.last_rigidbodies.len()
    }

    pub fn pending_len(&self) -> usize {
        self.current_colliders.len() + self.current_rigidbodies.len()
    }

    /// Drops this tick's pushes without dispatching anything.
    pub fn discard_pending(&mut self) {
        self.current_colliders.clear();
        self.current_rigidbodies.clear();
    }

    pub fn clear(&mut self) {
        self.discard_pending();
        self.last_colliders.clear();
        self.last_rigidbodies.clear();
    }
}
