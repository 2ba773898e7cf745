//! # Entity Ids — Generational Slot Names
//!
//! An [`EntityId`] is just a name: it owns nothing. The
//! [`Scene`](crate::scene::Scene) maps it to a tree node, and every
//! [`ComponentPool`](super::pool::ComponentPool) maps it to that entity's
//! component value.
//!
//! ## Generations
//!
//! Slots are recycled after an entity is removed. Pairing the slot index with
//! a generation counter keeps old ids from aliasing the new occupant:
//!
//! ```text
//! EntityId { index: 5, generation: 0 }  ← original
//! EntityId { index: 5, generation: 1 }  ← after recycle
//! ```
//!
//! A stale id still says `generation: 0`, so every lookup rejects it.
//!
//! ## Recycling Order
//!
//! Freed indices go to the back of a double-ended queue and allocation takes
//! from the front. Reuse is therefore FIFO: the most recently freed slot is the
//! last to come back.

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use crate::error::{EcsError, EcsResult};

/// Opaque, copyable name of an entity slot.
///
/// Two ids are equal only if both the slot index and the generation match.
/// Ids are totally ordered (by index, then generation) and hashable.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EntityId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl EntityId {
    /// The id of every scene's root node. Never handed out by an allocator.
    pub const ROOT: EntityId = EntityId {
        index: u32::MAX,
        generation: 0,
    };

    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index. Useful for diagnostics and dense side tables.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot at the time this id was issued.
    pub fn generation(self) -> u32 {
        self.generation
    }

    /// Returns `true` for [`EntityId::ROOT`].
    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "Entity(root)")
        } else {
            write!(f, "Entity({}v{})", self.index, self.generation)
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "root")
        } else {
            write!(f, "{}v{}", self.index, self.generation)
        }
    }
}

/// Hands out [`EntityId`]s and recycles them.
///
/// ```text
/// generations: [0, 1, 0, 2, 0]   ← one generation per slot ever allocated
/// usable_ids:  [1, 3]             ← freed slots, reused front-first
/// existing:    5                  ← high-water mark, next fresh index
/// ```
#[derive(Debug, Default)]
pub struct EntityAllocator {
    generations: Vec<u32>,
    usable_ids: VecDeque<u32>,
    existing_id_count: u32,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve room for `additional` fresh slots.
    pub fn reserve(&mut self, additional: usize) {
        self.generations.reserve(additional);
    }

    /// Allocate an id, reusing the front of the free list when possible.
    ///
    /// Fails with [`EcsError::IdsExhausted`] once every index below
    /// `EntityId::ROOT`'s has been handed out and none is free.
    pub fn allocate(&mut self) -> EcsResult<EntityId> {
        if let Some(index) = self.usable_ids.pop_front() {
            // Generation was already bumped when the slot was freed.
            return Ok(EntityId::new(index, self.generations[index as usize]));
        }
        let index = self.existing_id_count;
        if index >= EntityId::ROOT.index {
            return Err(EcsError::IdsExhausted(index));
        }
        self.existing_id_count += 1;
        self.generations.push(0);
        Ok(EntityId::new(index, 0))
    }

    /// Free an id, invalidating every copy of it.
    ///
    /// Returns `false` if the id was already stale.
    pub fn deallocate(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let slot = &mut self.generations[id.index as usize];
        *slot = slot.wrapping_add(1);
        self.usable_ids.push_back(id.index);
        true
    }

    /// Check whether `id` names a live slot with a matching generation.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.generations
            .get(id.index as usize)
            .is_some_and(|&generation| generation == id.generation)
    }

    /// Number of currently live ids.
    pub fn alive_count(&self) -> usize {
        self.existing_id_count as usize - self.usable_ids.len()
    }

    /// Number of freed slots waiting for reuse.
    pub fn free_count(&self) -> usize {
        self.usable_ids.len()
    }

    /// High-water mark: total number of slots ever allocated.
    pub fn total_slots(&self) -> u32 {
        self.existing_id_count
    }
}
