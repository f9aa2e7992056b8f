use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Generational handle of a collider stored in an [`Arena`].
///
/// A handle keeps resolving only while the slot it was issued for still holds
/// the same generation, so a handle to a destroyed collider is detectably stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ColliderId {
    index: u32,
    generation: u32,
}

impl ColliderId {
    /// Handle that never resolves. Used as "no collider".
    pub const NULL: ColliderId = ColliderId {
        index: u32::MAX,
        generation: 0,
    };

    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for ColliderId {
    fn default() -> Self {
        Self::NULL
    }
}

impl std::fmt::Display for ColliderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            write!(f, "collider(null)")
        } else {
            write!(f, "collider({}v{})", self.index, self.generation)
        }
    }
}

/// Generational arena that hands out stable ids while preventing use-after-free.
pub struct Arena<T> {
    items: Vec<Option<T>>,
    generations: Vec<u32>,
    free_list: VecDeque<usize>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            generations: Vec::new(),
            free_list: VecDeque::new(),
        }
    }

    pub fn insert(&mut self, item: T) -> ColliderId {
        if let Some(index) = self.free_list.pop_front() {
            let generation = self.generations[index];
            self.items[index] = Some(item);
            return ColliderId::new(index as u32, generation);
        }

        let index = self.items.len();
        self.items.push(Some(item));
        self.generations.push(0);
        ColliderId::new(index as u32, 0)
    }

    /// Inserts a value built from the id it is about to receive.
    pub fn insert_with(&mut self, build: impl FnOnce(ColliderId) -> T) -> ColliderId {
        let id = match self.free_list.front() {
            Some(&index) => ColliderId::new(index as u32, self.generations[index]),
            None => ColliderId::new(self.items.len() as u32, 0),
        };
        let inserted = self.insert(build(id));
        debug_assert_eq!(id, inserted);
        inserted
    }

    pub fn get(&self, id: ColliderId) -> Option<&T> {
        if self.is_valid(id) {
            self.items.get(id.index()).and_then(|slot| slot.as_ref())
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, id: ColliderId) -> Option<&mut T> {
        if self.is_valid(id) {
            self.items.get_mut(id.index()).and_then(|slot| slot.as_mut())
        } else {
            None
        }
    }

    pub fn contains(&self, id: ColliderId) -> bool {
        self.get(id).is_some()
    }

    pub fn remove(&mut self, id: ColliderId) -> Option<T> {
        if !self.is_valid(id) {
            return None;
        }
        let slot = self.items.get_mut(id.index())?;
        if slot.is_some() {
            self.generations[id.index()] = self.generations[id.index()].wrapping_add(1);
            self.free_list.push_back(id.index());
        }
        slot.take()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColliderId, &T)> + '_ {
        self.items.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref()
                .map(|item| (ColliderId::new(index as u32, self.generations[index]), item))
        })
    }

    pub fn ids(&self) -> impl Iterator<Item = ColliderId> + '_ {
        self.iter().map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.items.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_valid(&self, id: ColliderId) -> bool {
        self.generations
            .get(id.index())
            .copied()
            .map(|gen| gen == id.generation())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_handles_go_stale() {
        let mut arena = Arena::new();
        let first = arena.insert("a");
        assert_eq!(arena.remove(first), Some("a"));

        let reused = arena.insert("b");
        assert_eq!(reused.index(), first.index());
        assert_ne!(reused, first);
        assert!(arena.get(first).is_none());
        assert_eq!(arena.get(reused), Some(&"b"));
        assert_eq!(arena.remove(first), None, "stale handle must not free the new item");
    }

    #[test]
    fn insert_with_sees_its_own_id() {
        let mut arena = Arena::new();
        let id = arena.insert_with(|id| id);
        assert_eq!(arena.get(id), Some(&id));
        assert!(ColliderId::NULL.is_null());
        assert!(arena.get(ColliderId::NULL).is_none());
    }
}
