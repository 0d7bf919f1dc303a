//! Growable slot storage for points and elements.
//!
//! An [`Arena`] owns a dense vector of slots addressed by a typed id. Slot 0 is
//! reserved and never handed out. Freed slots are not compacted: they become
//! [`Slot::Vacant`] and are threaded into a singly linked free list through
//! the slot storage itself, so a later allocation reuses them.
//!
//! Two counters describe the state:
//! - `count`: the highest live slot, which bounds the numbering walked by the
//!   compaction pass;
//! - the free-list head: the first reusable slot, or `None` once the logical
//!   capacity is used up.
//!
//! When the free list is empty, [`Arena::alloc`] returns `None`;
//! [`Arena::alloc_or_grow`] then grows the logical capacity by the configured
//! fraction and retries once. Growing never moves ids, but it may reallocate
//! the backing vector, so references into the arena do not survive it.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use super::index::ArenaId;
use crate::error::{MeshError, Result};

/// One arena slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    /// A live entity.
    Occupied(T),
    /// A reusable slot; `next` links to the following free slot.
    Vacant {
        /// Next free slot, if any.
        next: Option<usize>,
    },
}

impl<T> Slot<T> {
    #[inline]
    fn occupied(&self) -> Option<&T> {
        match self {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    #[inline]
    fn occupied_mut(&mut self) -> Option<&mut T> {
        match self {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }
}

/// Slot storage with an intrusive free list.
#[derive(Debug, Clone)]
pub struct Arena<I: ArenaId, T> {
    slots: Vec<Slot<T>>,
    count: usize,
    active: usize,
    free_head: Option<usize>,
    limit: usize,
    growth: f64,
    kind: &'static str,
    _id: PhantomData<I>,
}

impl<I: ArenaId, T> Arena<I, T> {
    /// Create an arena with `capacity` usable slots that may grow up to
    /// `limit` slots, by `growth * capacity` slots at a time.
    pub fn new(kind: &'static str, capacity: usize, limit: usize, growth: f64) -> Self {
        let mut arena = Self {
            slots: vec![Slot::Vacant { next: None }],
            count: 0,
            active: 0,
            free_head: None,
            limit: limit.max(capacity),
            growth,
            kind,
            _id: PhantomData,
        };
        arena.extend_free(capacity);
        arena
    }

    // ==================== Accessors ====================

    /// Number of usable slots (slot 0 excluded).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len() - 1
    }

    /// Hard limit on the capacity.
    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Highest live slot.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of live entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.active
    }

    /// Whether no entity is live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// Whether `id` addresses a live entity.
    #[inline]
    pub fn contains(&self, id: I) -> bool {
        self.get(id).is_some()
    }

    /// Get a live entity.
    #[inline]
    pub fn get(&self, id: I) -> Option<&T> {
        self.slots.get(id.index()).and_then(Slot::occupied)
    }

    /// Get a live entity mutably.
    #[inline]
    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.slots.get_mut(id.index()).and_then(Slot::occupied_mut)
    }

    /// Iterate over live entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> + '_ {
        self.slots[..=self.count]
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(i, slot)| slot.occupied().map(|value| (I::from_index(i), value)))
    }

    /// Iterate over live ids in slot order.
    pub fn ids(&self) -> impl Iterator<Item = I> + '_ {
        self.iter().map(|(id, _)| id)
    }

    /// Walk the free list from its head.
    pub fn free_slots(&self) -> FreeSlots<'_, T> {
        FreeSlots {
            slots: &self.slots,
            current: self.free_head,
        }
    }

    // ==================== Allocation ====================

    /// Store `value` in the first free slot.
    ///
    /// Returns `None` (and drops `value`) when the capacity is used up.
    pub fn alloc(&mut self, value: T) -> Option<I> {
        self.try_alloc(value).ok()
    }

    /// Store `value`, growing the arena once if it is full.
    ///
    /// # Errors
    /// [`MeshError::ArenaExhausted`] if the arena is already at its limit.
    pub fn alloc_or_grow(&mut self, value: T) -> Result<I> {
        match self.try_alloc(value) {
            Ok(id) => Ok(id),
            Err(value) => {
                self.grow()?;
                self.try_alloc(value).map_err(|_| self.exhausted())
            }
        }
    }

    /// Grow the logical capacity by the growth fraction, bounded by the limit.
    ///
    /// # Errors
    /// [`MeshError::ArenaExhausted`] if the limit is already reached.
    pub fn grow(&mut self) -> Result<()> {
        let capacity = self.capacity();
        if capacity >= self.limit {
            log::warn!(
                "unable to grow {} arena past its limit of {}",
                self.kind,
                self.limit
            );
            return Err(self.exhausted());
        }

        let step = ((capacity as f64 * self.growth).ceil() as usize).max(1);
        let added = step.min(self.limit - capacity);
        self.extend_free(added);
        log::debug!(
            "{} arena grown from {} to {} slots",
            self.kind,
            capacity,
            self.capacity()
        );
        Ok(())
    }

    /// Release a live entity, returning it.
    ///
    /// The slot becomes the new head of the free list.
    pub fn free(&mut self, id: I) -> Option<T> {
        let index = id.index();
        self.get(id)?;

        let slot = std::mem::replace(
            &mut self.slots[index],
            Slot::Vacant {
                next: self.free_head,
            },
        );
        self.free_head = Some(index);
        self.active -= 1;
        while self.count > 0 && self.slots[self.count].occupied().is_none() {
            self.count -= 1;
        }

        match slot {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    // ==================== Compaction support ====================

    /// Move the entity in slot `from` to slot `to`, leaving `from` vacant.
    ///
    /// The free list is not maintained; callers finish with
    /// [`Arena::reset_free_list`].
    pub(crate) fn relocate(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        let slot = std::mem::replace(&mut self.slots[from], Slot::Vacant { next: None });
        self.slots[to] = slot;
    }

    /// Declare slots `1..=count` live and thread every slot above them into
    /// the free list in ascending order.
    pub(crate) fn reset_free_list(&mut self, count: usize) {
        let capacity = self.capacity();
        for index in count + 1..=capacity {
            let next = (index < capacity).then_some(index + 1);
            self.slots[index] = Slot::Vacant { next };
        }
        self.free_head = (count < capacity).then_some(count + 1);
        self.count = count;
        self.active = self.slots[1..=count]
            .iter()
            .filter(|slot| slot.occupied().is_some())
            .count();
    }

    // ==================== Internals ====================

    fn try_alloc(&mut self, value: T) -> std::result::Result<I, T> {
        let Some(head) = self.free_head else {
            return Err(value);
        };
        let next = match self.slots[head] {
            Slot::Vacant { next } => next,
            Slot::Occupied(_) => unreachable!("free list points at a live slot"),
        };
        self.slots[head] = Slot::Occupied(value);
        self.free_head = next;
        self.active += 1;
        self.count = self.count.max(head);
        Ok(I::from_index(head))
    }

    /// Append `added` vacant slots ahead of the current free list.
    fn extend_free(&mut self, added: usize) {
        if added == 0 {
            return;
        }
        let first = self.slots.len();
        let last = first + added - 1;
        self.slots.reserve(added);
        for index in first..=last {
            let next = if index < last {
                Some(index + 1)
            } else {
                self.free_head
            };
            self.slots.push(Slot::Vacant { next });
        }
        self.free_head = Some(first);
    }

    fn exhausted(&self) -> MeshError {
        MeshError::ArenaExhausted {
            kind: self.kind,
            limit: self.limit,
        }
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        match self.get(id) {
            Some(value) => value,
            None => panic!("{} {:?} is not live", self.kind, id),
        }
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        let kind = self.kind;
        match self.get_mut(id) {
            Some(value) => value,
            None => panic!("{} {:?} is not live", kind, id),
        }
    }
}

/// Iterator over the free list of an [`Arena`].
pub struct FreeSlots<'a, T> {
    slots: &'a [Slot<T>],
    current: Option<usize>,
}

impl<T> Iterator for FreeSlots<'_, T> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let index = self.current?;
        self.current = match self.slots[index] {
            Slot::Vacant { next } => next,
            Slot::Occupied(_) => None,
        };
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::index::PointId;

    fn arena(capacity: usize, limit: usize) -> Arena<PointId, u32> {
        Arena::new("point", capacity, limit, 0.5)
    }

    #[test]
    fn test_slot_zero_is_reserved() {
        let mut a = arena(4, 4);
        let first = a.alloc(10).unwrap();
        assert_eq!(first.index(), 1);
        assert_eq!(a.count(), 1);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_exhaustion_returns_none() {
        let mut a = arena(2, 2);
        assert!(a.alloc(1).is_some());
        assert!(a.alloc(2).is_some());
        assert!(a.alloc(3).is_none());
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_free_slot_is_reused_first() {
        let mut a = arena(4, 4);
        let p1 = a.alloc(1).unwrap();
        let p2 = a.alloc(2).unwrap();
        let _p3 = a.alloc(3).unwrap();

        assert_eq!(a.free(p2), Some(2));
        assert!(!a.contains(p2));
        assert_eq!(a.free_slots().collect::<Vec<_>>(), vec![2, 4]);

        let again = a.alloc(20).unwrap();
        assert_eq!(again, p2);
        assert_eq!(a[again], 20);
        assert_eq!(a[p1], 1);
    }

    #[test]
    fn test_count_shrinks_past_trailing_holes() {
        let mut a = arena(4, 4);
        let p1 = a.alloc(1).unwrap();
        let p2 = a.alloc(2).unwrap();
        let p3 = a.alloc(3).unwrap();
        a.free(p2);
        a.free(p3);
        assert_eq!(a.count(), 1);
        assert_eq!(a.ids().collect::<Vec<_>>(), vec![p1]);
    }

    #[test]
    fn test_grow_and_retry() {
        let mut a = arena(2, 10);
        a.alloc(1).unwrap();
        a.alloc(2).unwrap();
        let p3 = a.alloc_or_grow(3).unwrap();
        assert_eq!(p3.index(), 3);
        assert_eq!(a.capacity(), 3);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn test_grow_failure_is_fatal() {
        let mut a = arena(1, 1);
        a.alloc(1).unwrap();
        let err = a.alloc_or_grow(2).unwrap_err();
        assert_eq!(err, MeshError::ArenaExhausted { kind: "point", limit: 1 });
        assert!(err.is_fatal());
    }

    #[test]
    fn test_reset_free_list_is_ascending() {
        let mut a = arena(6, 6);
        for v in 0..4 {
            a.alloc(v).unwrap();
        }
        a.free(PointId::new(2));
        a.relocate(3, 2);
        a.relocate(4, 3);
        a.reset_free_list(3);

        assert_eq!(a.count(), 3);
        assert_eq!(a.len(), 3);
        assert_eq!(a.free_slots().collect::<Vec<_>>(), vec![4, 5, 6]);
        assert_eq!(a[PointId::new(2)], 2);
        assert_eq!(a[PointId::new(3)], 3);
    }

    #[test]
    #[should_panic]
    fn test_index_vacant_panics() {
        let a = arena(2, 2);
        let _ = a[PointId::new(1)];
    }
}
