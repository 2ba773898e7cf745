//! # Component Pools — One Sparse Set per Component Type
//!
//! A [`ComponentPool<T>`] stores every live `T` in a packed `Vec<T>` so systems
//! can walk it linearly, plus two index maps that tie each slot to its entity.
//!
//! ## Memory Layout
//!
//! ```text
//! dense:          [pos_a, pos_c, pos_b]   ← packed, no holes
//! entity_of:      [a,     c,     b    ]   ← parallel array, index → id
//! enabled:        [true,  false, true ]   ← per-component flag
//! dense_index_of: { a: 0, b: 2, c: 1 }    ← id → index
//! ```
//!
//! ## Swap-Removal
//!
//! Removing `a` moves the last element into slot 0 and pops the tail:
//!
//! ```text
//! dense:          [pos_b, pos_c]
//! entity_of:      [b,     c    ]
//! enabled:        [true,  false]
//! dense_index_of: { b: 0, c: 1 }          ← moved entry rewritten
//! ```
//!
//! Removal is O(1) and keeps the array contiguous. The price is that storage
//! order is **not stable** across removals: iteration order may change
//! whenever an element is removed.

use std::collections::HashMap;

use super::component::{Component, component_name};
use super::entity::EntityId;
use crate::error::{EcsError, EcsResult};

/// Packed storage for all live components of type `T`.
#[derive(Debug)]
pub struct ComponentPool<T> {
    dense: Vec<T>,
    entity_of: Vec<EntityId>,
    enabled: Vec<bool>,
    dense_index_of: HashMap<EntityId, usize>,
    /// Set by every `add`; cleared once the owners have been checked against
    /// a scene's live ids.
    unverified: bool,
}

fn not_found<T: Component>(entity: EntityId) -> EcsError {
    EcsError::ComponentNotFound {
        entity,
        component: component_name::<T>(),
    }
}

impl<T: Component> ComponentPool<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dense: Vec::with_capacity(capacity),
            entity_of: Vec::with_capacity(capacity),
            enabled: Vec::with_capacity(capacity),
            dense_index_of: HashMap::with_capacity(capacity),
            unverified: false,
        }
    }

    /// Attach `value` to `id`, appending it to the packed array. The new
    /// component starts enabled.
    ///
    /// Fails with [`EcsError::DuplicateComponent`] if `id` already has one;
    /// the existing value is left untouched.
    pub fn add(&mut self, id: EntityId, value: T) -> EcsResult<&mut T> {
        if self.dense_index_of.contains_key(&id) {
            return Err(EcsError::DuplicateComponent {
                entity: id,
                component: component_name::<T>(),
            });
        }
        let index = self.dense.len();
        self.dense.push(value);
        self.entity_of.push(id);
        self.enabled.push(true);
        self.dense_index_of.insert(id, index);
        self.unverified = true;
        Ok(&mut self.dense[index])
    }

    /// Detach and return the component of `id` using swap-removal.
    pub fn remove(&mut self, id: EntityId) -> EcsResult<T> {
        let index = self
            .dense_index_of
            .remove(&id)
            .ok_or_else(|| not_found::<T>(id))?;

        let value = self.dense.swap_remove(index);
        self.entity_of.swap_remove(index);
        self.enabled.swap_remove(index);

        // The former tail now lives at `index`; repoint its sparse entry.
        if let Some(&moved) = self.entity_of.get(index) {
            self.dense_index_of.insert(moved, index);
        }
        Ok(value)
    }

    pub fn get(&self, id: EntityId) -> EcsResult<&T> {
        self.try_get(id).ok_or_else(|| not_found::<T>(id))
    }

    pub fn get_mut(&mut self, id: EntityId) -> EcsResult<&mut T> {
        self.try_get_mut(id).ok_or_else(|| not_found::<T>(id))
    }

    /// Like [`get`](Self::get), but `None` instead of an error.
    pub fn try_get(&self, id: EntityId) -> Option<&T> {
        let &index = self.dense_index_of.get(&id)?;
        self.dense.get(index)
    }

    pub fn try_get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        let &index = self.dense_index_of.get(&id)?;
        self.dense.get_mut(index)
    }

    /// The component's own flag, independent of its entity's.
    pub fn is_enabled(&self, id: EntityId) -> EcsResult<bool> {
        let index = self.index_of(id)?;
        Ok(self.enabled[index])
    }

    pub fn set_enabled(&mut self, id: EntityId, enabled: bool) -> EcsResult<()> {
        let index = self.index_of(id)?;
        self.enabled[index] = enabled;
        Ok(())
    }

    fn index_of(&self, id: EntityId) -> EcsResult<usize> {
        self.dense_index_of
            .get(&id)
            .copied()
            .ok_or_else(|| not_found::<T>(id))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.dense_index_of.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Iterate components in storage order (not stable across removals).
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.dense.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.dense.iter_mut()
    }

    /// Iterate `(owner, component)` pairs in storage order.
    pub fn iter_with_ids(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.entity_of.iter().copied().zip(self.dense.iter())
    }

    pub fn iter_with_ids_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.entity_of.iter().copied().zip(self.dense.iter_mut())
    }

    /// Iterate only components whose own enabled flag is set.
    pub fn iter_enabled(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.iter_with_ids()
            .zip(self.enabled.iter())
            .filter_map(|(pair, &on)| on.then_some(pair))
    }

    pub fn iter_enabled_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.entity_of
            .iter()
            .copied()
            .zip(self.dense.iter_mut())
            .zip(self.enabled.iter())
            .filter_map(|(pair, &on)| on.then_some(pair))
    }

    /// Owners, parallel to [`as_slice`](Self::as_slice).
    pub fn entities(&self) -> &[EntityId] {
        &self.entity_of
    }

    pub fn as_slice(&self) -> &[T] {
        &self.dense
    }

    /// Mutable access to the values. Membership can only change through
    /// [`add`](Self::add) and [`remove`](Self::remove).
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.dense
    }

    /// Owner of the component stored at `index`.
    pub fn entity_id(&self, index: usize) -> Option<EntityId> {
        self.entity_of.get(index).copied()
    }

    /// Storage index of the component owned by `id`.
    pub fn entity_id_to_index(&self, id: EntityId) -> Option<usize> {
        self.dense_index_of.get(&id).copied()
    }

    /// Drop every component whose owner fails `keep`. Returns how many were
    /// dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(EntityId) -> bool) -> usize {
        let mut dropped = 0;
        let mut index = 0;
        while let Some(&owner) = self.entity_of.get(index) {
            if keep(owner) {
                index += 1;
            } else {
                // Swap-removal pulls an unvisited entry into `index`.
                let _ = self.remove(owner);
                dropped += 1;
            }
        }
        dropped
    }

    /// Whether entries were added since the last
    /// [`mark_verified`](Self::mark_verified).
    pub(crate) fn is_unverified(&self) -> bool {
        self.unverified
    }

    pub(crate) fn mark_verified(&mut self) {
        self.unverified = false;
    }

    /// Drop every component.
    pub fn clear(&mut self) {
        self.dense.clear();
        self.entity_of.clear();
        self.enabled.clear();
        self.dense_index_of.clear();
        self.unverified = false;
    }

    #[cfg(test)]
    pub(crate) fn assert_packed(&self) {
        assert_eq!(self.dense.len(), self.entity_of.len());
        assert_eq!(self.dense.len(), self.enabled.len());
        assert_eq!(self.dense.len(), self.dense_index_of.len());
        for (&id, &index) in &self.dense_index_of {
            assert_eq!(self.entity_of[index], id, "stale reverse mapping");
        }
    }
}

impl<T: Component> Default for ComponentPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Component> IntoIterator for &'a ComponentPool<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T: Component> IntoIterator for &'a mut ComponentPool<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
