//! # Pool Registry — Type-Erased Map of Component Pools
//!
//! [`ComponentPools`] owns at most one [`ComponentPool<T>`] per component type,
//! keyed by [`TypeId`]. Pools are stored as `Box<dyn ErasedPool>` so the scene
//! can tear down, clone, or unregister entities across *all* pools without
//! knowing their element types. Typed access downcasts through [`Any`], guarded
//! by the `TypeId` key.
//!
//! ```text
//! pools: HashMap<TypeId, Box<dyn ErasedPool>>
//!   TypeId(Transform) → ComponentPool<Transform>
//!   TypeId(Health)    → ComponentPool<Health>
//! ```
//!
//! ## Scene access
//!
//! A scene hands its pools out through [`PoolsMut`] and [`PoolMut`]. Both
//! deref to the plain registry or pool, and on drop they discard any entry
//! added for an id that is not alive in the scene, so pool data never
//! outlives its entity.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use super::component::{Component, component_name, component_type_id, short_type_name};
use super::entity::{EntityAllocator, EntityId};
use super::pool::ComponentPool;
use crate::error::{EcsError, EcsResult};

/// Operations every pool supports regardless of its element type.
pub trait ErasedPool: Any {
    /// Full type name of the element type.
    fn type_name(&self) -> &'static str;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains_entity(&self, id: EntityId) -> bool;

    /// Owners of every stored component, in storage order.
    fn entity_ids(&self) -> &[EntityId];

    /// Drop the component of `id` if present. Returns whether one was removed.
    fn unregister_entity(&mut self, id: EntityId) -> bool;

    /// Copy the component of `from` (value and enabled flag) onto `to`.
    /// Returns `Ok(false)` when `from` holds nothing in this pool.
    fn clone_entity(&mut self, from: EntityId, to: EntityId) -> EcsResult<bool>;

    /// If entries were added since the last check, drop those whose owner
    /// fails `is_alive`. Returns how many were dropped.
    fn purge_dead(&mut self, is_alive: &dyn Fn(EntityId) -> bool) -> usize;

    /// Drop every component but keep the pool registered.
    fn clear(&mut self);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Component> ErasedPool for ComponentPool<T> {
    fn type_name(&self) -> &'static str {
        component_name::<T>()
    }

    fn len(&self) -> usize {
        ComponentPool::len(self)
    }

    fn contains_entity(&self, id: EntityId) -> bool {
        self.contains(id)
    }

    fn entity_ids(&self) -> &[EntityId] {
        self.entities()
    }

    fn unregister_entity(&mut self, id: EntityId) -> bool {
        self.remove(id).is_ok()
    }

    fn clone_entity(&mut self, from: EntityId, to: EntityId) -> EcsResult<bool> {
        let Some(value) = self.try_get(from).cloned() else {
            return Ok(false);
        };
        let enabled = self.is_enabled(from)?;
        self.add(to, value)?;
        self.set_enabled(to, enabled)?;
        Ok(true)
    }

    fn purge_dead(&mut self, is_alive: &dyn Fn(EntityId) -> bool) -> usize {
        if !self.is_unverified() {
            return 0;
        }
        let dropped = self.retain(is_alive);
        self.mark_verified();
        dropped
    }

    fn clear(&mut self) {
        ComponentPool::clear(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Registry of component pools, one per component type.
#[derive(Default)]
pub struct ComponentPools {
    pools: HashMap<TypeId, Box<dyn ErasedPool>>,
}

impl ComponentPools {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty pool for `T`, or return the existing one unchanged.
    pub fn add<T: Component>(&mut self) -> &mut ComponentPool<T> {
        let pool = self
            .pools
            .entry(component_type_id::<T>())
            .or_insert_with(|| {
                log::debug!("registered pool for `{}`", component_name::<T>());
                Box::new(ComponentPool::<T>::new())
            });
        downcast_mut::<T>(&mut **pool)
    }

    /// Alias of [`add`](Self::add), reads better at lazy call sites.
    pub fn get_or_add<T: Component>(&mut self) -> &mut ComponentPool<T> {
        self.add::<T>()
    }

    /// Unregister the pool for `T`, handing back its contents.
    pub fn remove<T: Component>(&mut self) -> EcsResult<ComponentPool<T>> {
        let boxed = self
            .pools
            .remove(&component_type_id::<T>())
            .ok_or_else(pool_not_found::<T>)?;
        log::debug!("unregistered pool for `{}`", component_name::<T>());
        let pool = boxed
            .into_any()
            .downcast::<ComponentPool<T>>()
            .map_err(|_| pool_not_found::<T>())?;
        Ok(*pool)
    }

    pub fn get<T: Component>(&self) -> Option<&ComponentPool<T>> {
        self.pools
            .get(&component_type_id::<T>())
            .and_then(|pool| pool.as_any().downcast_ref())
    }

    pub fn get_mut<T: Component>(&mut self) -> Option<&mut ComponentPool<T>> {
        self.pools
            .get_mut(&component_type_id::<T>())
            .and_then(|pool| pool.as_any_mut().downcast_mut())
    }

    /// Borrow two different pools mutably at once, for systems that walk
    /// parallel pools by index.
    ///
    /// Fails with [`EcsError::InvalidArgument`] if `A` and `B` are the same
    /// type, and with [`EcsError::PoolNotFound`] if either is unregistered.
    pub fn pair_mut<A: Component, B: Component>(
        &mut self,
    ) -> EcsResult<(&mut ComponentPool<A>, &mut ComponentPool<B>)> {
        let (ta, tb) = (component_type_id::<A>(), component_type_id::<B>());
        if ta == tb {
            return Err(EcsError::InvalidArgument(format!(
                "cannot borrow the `{}` pool twice",
                component_name::<A>()
            )));
        }

        let mut a = None;
        let mut b = None;
        for (tid, pool) in self.pools.iter_mut() {
            if *tid == ta {
                a = pool.as_any_mut().downcast_mut::<ComponentPool<A>>();
            } else if *tid == tb {
                b = pool.as_any_mut().downcast_mut::<ComponentPool<B>>();
            }
        }
        match (a, b) {
            (Some(a), Some(b)) => Ok((a, b)),
            (None, _) => Err(pool_not_found::<A>()),
            (_, None) => Err(pool_not_found::<B>()),
        }
    }

    pub fn contains<T: Component>(&self) -> bool {
        self.pools.contains_key(&component_type_id::<T>())
    }

    /// Number of registered pools.
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Every registered pool as `(type tag, erased pool)`.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &dyn ErasedPool)> {
        self.pools.iter().map(|(&tid, pool)| (tid, &**pool))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (TypeId, &mut dyn ErasedPool)> {
        self.pools
            .iter_mut()
            .map(|(&tid, pool)| (tid, &mut **pool as &mut dyn ErasedPool))
    }

    /// Short names of all registered component types, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .pools
            .values()
            .map(|pool| short_type_name(pool.type_name()))
            .collect();
        names.sort_unstable();
        names
    }

    /// Drop `id`'s component from every pool. Returns how many were removed.
    pub fn unregister_entity(&mut self, id: EntityId) -> usize {
        let mut removed = 0;
        for pool in self.pools.values_mut() {
            if pool.unregister_entity(id) {
                removed += 1;
            }
        }
        removed
    }

    /// Whether any pool still holds data for `id`.
    pub fn holds_entity(&self, id: EntityId) -> bool {
        self.pools.values().any(|pool| pool.contains_entity(id))
    }

    /// Copy every component of `from` onto `to`. Returns how many were copied.
    pub fn clone_entity(&mut self, from: EntityId, to: EntityId) -> EcsResult<usize> {
        let mut copied = 0;
        for pool in self.pools.values_mut() {
            if pool.clone_entity(from, to)? {
                copied += 1;
            }
        }
        Ok(copied)
    }

    /// Drop entries whose owner fails `is_alive`, scanning only pools that
    /// gained entries since their last check. Returns how many were dropped.
    pub fn purge_dead(&mut self, is_alive: &dyn Fn(EntityId) -> bool) -> usize {
        self.pools
            .values_mut()
            .map(|pool| pool.purge_dead(is_alive))
            .sum()
    }

    /// Empty every pool, keeping registrations.
    pub fn clear_entries(&mut self) {
        for pool in self.pools.values_mut() {
            pool.clear();
        }
    }

    /// Drop every pool.
    pub fn clear(&mut self) {
        self.pools.clear();
    }
}

/// Mutable view of a scene's pool registry.
pub struct PoolsMut<'s> {
    pools: &'s mut ComponentPools,
    allocator: &'s EntityAllocator,
}

impl<'s> PoolsMut<'s> {
    pub(crate) fn new(pools: &'s mut ComponentPools, allocator: &'s EntityAllocator) -> Self {
        Self { pools, allocator }
    }
}

impl Deref for PoolsMut<'_> {
    type Target = ComponentPools;

    fn deref(&self) -> &ComponentPools {
        &*self.pools
    }
}

impl DerefMut for PoolsMut<'_> {
    fn deref_mut(&mut self) -> &mut ComponentPools {
        &mut *self.pools
    }
}

impl Drop for PoolsMut<'_> {
    fn drop(&mut self) {
        let allocator = self.allocator;
        let dropped = self.pools.purge_dead(&|id| owner_is_live(allocator, id));
        if dropped > 0 {
            log::warn!("discarded {dropped} component(s) added for dead entities");
        }
    }
}

/// Mutable view of one of a scene's pools.
pub struct PoolMut<'s, T: Component> {
    pool: &'s mut ComponentPool<T>,
    allocator: &'s EntityAllocator,
}

impl<'s, T: Component> PoolMut<'s, T> {
    pub(crate) fn new(pool: &'s mut ComponentPool<T>, allocator: &'s EntityAllocator) -> Self {
        Self { pool, allocator }
    }
}

impl<T: Component> Deref for PoolMut<'_, T> {
    type Target = ComponentPool<T>;

    fn deref(&self) -> &ComponentPool<T> {
        &*self.pool
    }
}

impl<T: Component> DerefMut for PoolMut<'_, T> {
    fn deref_mut(&mut self) -> &mut ComponentPool<T> {
        &mut *self.pool
    }
}

impl<T: Component> Drop for PoolMut<'_, T> {
    fn drop(&mut self) {
        let allocator = self.allocator;
        let dropped =
            ErasedPool::purge_dead(&mut *self.pool, &|id| owner_is_live(allocator, id));
        if dropped > 0 {
            log::warn!(
                "discarded {dropped} `{}` component(s) added for dead entities",
                component_name::<T>()
            );
        }
    }
}

/// The root is never allocated but may hold components.
fn owner_is_live(allocator: &EntityAllocator, id: EntityId) -> bool {
    id.is_root() || allocator.is_alive(id)
}

fn pool_not_found<T: Component>() -> EcsError {
    EcsError::PoolNotFound {
        component: component_name::<T>(),
    }
}

fn downcast_mut<T: Component>(pool: &mut dyn ErasedPool) -> &mut ComponentPool<T> {
    pool.as_any_mut()
        .downcast_mut()
        .unwrap_or_else(|| {
            panic!(
                "pool type mismatch: expected `{}` in registry",
                component_name::<T>()
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }
    impl Component for Position {}

    #[derive(Debug, Clone, PartialEq)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }
    impl Component for Velocity {}

    fn id(index: u32) -> EntityId {
        EntityId::new(index, 0)
    }

    #[test]
    fn add_is_idempotent() {
        let mut pools = ComponentPools::new();
        pools.add::<Position>().add(id(0), Position { x: 1.0, y: 2.0 }).unwrap();

        // Second registration keeps the existing data.
        let pool = pools.add::<Position>();
        assert_eq!(pool.len(), 1);
        assert_eq!(pools.len(), 1);
    }

    #[test]
    fn get_and_contains() {
        let mut pools = ComponentPools::new();
        assert!(pools.get::<Position>().is_none());
        assert!(!pools.contains::<Position>());

        pools.add::<Position>();
        assert!(pools.contains::<Position>());
        assert!(pools.get::<Position>().is_some());
        assert!(pools.get::<Velocity>().is_none());
    }

    #[test]
    fn remove_returns_contents_or_fails() {
        let mut pools = ComponentPools::new();
        pools.add::<Velocity>().add(id(4), Velocity { dx: 1.0, dy: 0.0 }).unwrap();

        let pool = pools.remove::<Velocity>().unwrap();
        assert_eq!(pool.get(id(4)).unwrap().dx, 1.0);
        assert!(!pools.contains::<Velocity>());

        let err = pools.remove::<Velocity>().unwrap_err();
        assert!(matches!(err, EcsError::PoolNotFound { .. }));
    }

    #[test]
    fn heterogeneous_iteration_visits_every_pool() {
        let mut pools = ComponentPools::new();
        pools.add::<Position>().add(id(0), Position { x: 0.0, y: 0.0 }).unwrap();
        pools.add::<Velocity>();

        let mut seen: Vec<(TypeId, usize)> = pools.iter().map(|(t, p)| (t, p.len())).collect();
        seen.sort_by_key(|&(_, len)| len);
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (TypeId::of::<Velocity>(), 0));
        assert_eq!(seen[1], (TypeId::of::<Position>(), 1));
        assert_eq!(pools.type_names(), vec!["Position", "Velocity"]);
    }

    #[test]
    fn unregister_entity_touches_all_pools() {
        let mut pools = ComponentPools::new();
        pools.add::<Position>().add(id(1), Position { x: 1.0, y: 1.0 }).unwrap();
        pools.add::<Velocity>().add(id(1), Velocity { dx: 1.0, dy: 1.0 }).unwrap();
        pools.add::<Velocity>().add(id(2), Velocity { dx: 2.0, dy: 2.0 }).unwrap();

        assert_eq!(pools.unregister_entity(id(1)), 2);
        assert!(!pools.holds_entity(id(1)));
        assert!(pools.holds_entity(id(2)));
        assert_eq!(pools.unregister_entity(id(1)), 0);
    }

    #[test]
    fn clone_entity_copies_values_independently() {
        let mut pools = ComponentPools::new();
        pools.add::<Position>().add(id(0), Position { x: 3.0, y: 4.0 }).unwrap();
        pools.add::<Velocity>();

        assert_eq!(pools.clone_entity(id(0), id(9)).unwrap(), 1);
        pools.get_mut::<Position>().unwrap().get_mut(id(9)).unwrap().x = 100.0;

        let positions = pools.get::<Position>().unwrap();
        assert_eq!(positions.get(id(0)).unwrap(), &Position { x: 3.0, y: 4.0 });
        assert_eq!(positions.get(id(9)).unwrap().x, 100.0);
        assert!(!pools.get::<Velocity>().unwrap().contains(id(9)));
    }

    #[test]
    fn clone_entity_carries_the_enabled_flag() {
        let mut pools = ComponentPools::new();
        let positions = pools.add::<Position>();
        positions.add(id(0), Position { x: 0.0, y: 0.0 }).unwrap();
        positions.set_enabled(id(0), false).unwrap();

        pools.clone_entity(id(0), id(1)).unwrap();
        assert!(!pools.get::<Position>().unwrap().is_enabled(id(1)).unwrap());
    }

    #[test]
    fn purge_dead_only_scans_touched_pools() {
        let mut pools = ComponentPools::new();
        pools.add::<Position>().add(id(0), Position { x: 0.0, y: 0.0 }).unwrap();
        pools.add::<Velocity>().add(id(1), Velocity { dx: 0.0, dy: 0.0 }).unwrap();

        assert_eq!(pools.purge_dead(&|owner| owner != id(1)), 1);
        assert!(!pools.holds_entity(id(1)));

        // Nothing was added since, so no pool is scanned again.
        assert_eq!(pools.purge_dead(&|_| false), 0);
        assert!(pools.holds_entity(id(0)));
    }

    #[test]
    fn pair_mut_walks_parallel_pools() {
        let mut pools = ComponentPools::new();
        for i in 0..3 {
            pools.add::<Position>().add(id(i), Position { x: 0.0, y: 0.0 }).unwrap();
            pools.add::<Velocity>().add(id(i), Velocity { dx: i as f32, dy: 1.0 }).unwrap();
        }

        let (positions, velocities) = pools.pair_mut::<Position, Velocity>().unwrap();
        for index in 0..positions.len() {
            let owner = positions.entity_id(index).unwrap();
            let vel = velocities.get(owner).unwrap().clone();
            let pos = &mut positions.as_mut_slice()[index];
            pos.x += vel.dx;
            pos.y += vel.dy;
        }

        assert_eq!(pools.get::<Position>().unwrap().get(id(2)).unwrap().x, 2.0);
    }

    #[test]
    fn pair_mut_rejects_same_type_and_missing_pools() {
        let mut pools = ComponentPools::new();
        pools.add::<Position>();
        assert!(matches!(
            pools.pair_mut::<Position, Position>(),
            Err(EcsError::InvalidArgument(_))
        ));
        assert!(matches!(
            pools.pair_mut::<Position, Velocity>(),
            Err(EcsError::PoolNotFound { .. })
        ));
    }

    #[test]
    fn clear_entries_keeps_registrations() {
        let mut pools = ComponentPools::new();
        pools.add::<Position>().add(id(0), Position { x: 0.0, y: 0.0 }).unwrap();
        pools.clear_entries();
        assert!(pools.contains::<Position>());
        assert!(pools.get::<Position>().unwrap().is_empty());

        pools.clear();
        assert!(pools.is_empty());
    }
}
