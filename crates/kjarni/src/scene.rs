//! # Scene — The Tree, the Pools, and the Systems
//!
//! A [`Scene`] owns everything: an arena of entity nodes indexed by
//! [`EntityId::index`], the id allocator, one [`ComponentPools`] registry, and
//! the [`Schedule`] of systems. It is the explicit context object handed to
//! every system hook; there is no global scene.
//!
//! ## Tree
//!
//! ```text
//! root (EntityId::ROOT, never allocated)
//! ├── camera      0v0
//! └── player      1v0
//!     └── sword   2v0
//! ```
//!
//! Parent/child links are ids, not references. Every node except the root has
//! exactly one parent and appears exactly once in that parent's child list.
//!
//! ## Destruction
//!
//! [`Scene::remove_entity`] destroys a subtree children-first. Each node is
//! dropped from every pool before its id goes back to the allocator, so a
//! recycled id never starts out with leftover components or children.
//!
//! ## Frame phases
//!
//! [`Scene::tick`] runs `before_update`, `update`, then `after_update` across
//! all systems in registration order. The three phases can also be driven
//! one at a time.

use crate::config::SceneConfig;
use crate::ecs::component::component_name;
use crate::ecs::node::EntityNode;
use crate::ecs::system::Phase;
use crate::ecs::{
    Component, ComponentPool, ComponentPools, Descendants, EntityAllocator, EntityCreationFlag,
    EntityId, EntityMut, EntityRef, PoolMut, PoolsMut, Schedule, System, Traversal,
};
use crate::error::{EcsError, EcsResult};
use crate::math::Transform;

pub struct Scene {
    config: SceneConfig,
    root: EntityNode,
    /// Arena of nodes, indexed by `EntityId::index`. `None` marks a free slot.
    slots: Vec<Option<EntityNode>>,
    allocator: EntityAllocator,
    pools: ComponentPools,
    systems: Schedule,
    frame_count: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    pub fn with_config(config: SceneConfig) -> Self {
        let mut allocator = EntityAllocator::new();
        allocator.reserve(config.entity_capacity);
        log::debug!(
            "created scene `{}` (capacity {})",
            config.root_name,
            config.entity_capacity
        );
        Self {
            root: EntityNode::root(config.root_name.clone()),
            slots: Vec::with_capacity(config.entity_capacity),
            allocator,
            pools: ComponentPools::new(),
            systems: Schedule::new(),
            frame_count: 0,
            config,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Completed [`tick`](Self::tick) calls.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    // ── Node access ──────────────────────────────────────────────────────

    pub(crate) fn try_node(&self, id: EntityId) -> Option<&EntityNode> {
        if id.is_root() {
            return Some(&self.root);
        }
        self.slots
            .get(id.index() as usize)?
            .as_ref()
            .filter(|node| node.id == id)
    }

    pub(crate) fn try_node_mut(&mut self, id: EntityId) -> Option<&mut EntityNode> {
        if id.is_root() {
            return Some(&mut self.root);
        }
        self.slots
            .get_mut(id.index() as usize)?
            .as_mut()
            .filter(|node| node.id == id)
    }

    fn node(&self, id: EntityId) -> EcsResult<&EntityNode> {
        self.try_node(id).ok_or(EcsError::EntityNotFound(id))
    }

    fn node_mut(&mut self, id: EntityId) -> EcsResult<&mut EntityNode> {
        self.try_node_mut(id).ok_or(EcsError::EntityNotFound(id))
    }

    /// Whether `id` names a live entity (the root always is).
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.try_node(id).is_some()
    }

    /// Live entities, not counting the root.
    pub fn entity_count(&self) -> usize {
        self.allocator.alive_count()
    }

    pub fn root(&self) -> EntityRef<'_> {
        EntityRef::new(self, EntityId::ROOT)
    }

    pub fn root_mut(&mut self) -> EntityMut<'_> {
        EntityMut::new(self, EntityId::ROOT)
    }

    /// Fails with [`EcsError::EntityNotFound`] for ids that were never
    /// allocated, were removed, or belong to an older generation of the slot.
    pub fn get_entity(&self, id: EntityId) -> EcsResult<EntityRef<'_>> {
        self.node(id)?;
        Ok(EntityRef::new(self, id))
    }

    pub fn get_entity_mut(&mut self, id: EntityId) -> EcsResult<EntityMut<'_>> {
        self.node(id)?;
        Ok(EntityMut::new(self, id))
    }

    // ── Structure ────────────────────────────────────────────────────────

    /// Create an entity under the root.
    pub fn new_entity(&mut self, name: &str, flag: EntityCreationFlag) -> EcsResult<EntityMut<'_>> {
        self.new_child(EntityId::ROOT, name, flag)
    }

    /// Create an entity as the last child of `parent`.
    pub fn new_child(
        &mut self,
        parent: EntityId,
        name: &str,
        flag: EntityCreationFlag,
    ) -> EcsResult<EntityMut<'_>> {
        let id = self.attach_node(parent, name.to_string())?;
        if flag == EntityCreationFlag::Default && self.config.attach_transform {
            self.pools.add::<Transform>().add(id, Transform::default())?;
        }
        log::debug!("created entity {id} `{name}` under {parent}");
        Ok(EntityMut::new(self, id))
    }

    fn attach_node(&mut self, parent: EntityId, name: String) -> EcsResult<EntityId> {
        self.node(parent)?;
        let id = self.allocator.allocate()?;
        debug_assert!(
            !self.pools.holds_entity(id),
            "recycled id {id} still has component data"
        );

        let slot = id.index() as usize;
        if slot >= self.slots.len() {
            self.slots.resize_with(slot + 1, || None);
        }
        self.slots[slot] = Some(EntityNode::new(id, name, Some(parent)));
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Deep-copy `base` and its subtree under fresh ids.
    ///
    /// Every component `base` (or a descendant) holds is cloned into the
    /// matching new entity, and each new node's name gets the configured
    /// clone suffix. The copy becomes the last child of `parent`, or of the
    /// root when `parent` is `None`. Returns the id of the copy of `base`.
    pub fn clone_entity(&mut self, base: EntityId, parent: Option<EntityId>) -> EcsResult<EntityId> {
        if base.is_root() {
            return Err(EcsError::InvalidArgument(
                "cannot clone the scene root".to_string(),
            ));
        }
        self.node(base)?;
        let target = parent.unwrap_or(EntityId::ROOT);
        self.node(target)?;

        // Plan the whole subtree up front (parents before children), so a copy
        // attached inside its own source is never cloned again.
        let mut plan: Vec<(EntityId, Option<usize>)> = vec![(base, None)];
        let mut cursor = 0;
        while cursor < plan.len() {
            if let Some(node) = self.try_node(plan[cursor].0) {
                plan.extend(node.children.iter().map(|&child| (child, Some(cursor))));
            }
            cursor += 1;
        }

        let mut created: Vec<EntityId> = Vec::with_capacity(plan.len());
        for (source, parent_slot) in plan {
            let dst_parent = parent_slot.map_or(target, |slot| created[slot]);
            let (name, enabled, layer) = {
                let node = self.node(source)?;
                let name = format!("{}{}", node.name, self.config.clone_suffix);
                (name, node.enabled, node.layer)
            };
            let id = self.attach_node(dst_parent, name)?;
            let node = self.node_mut(id)?;
            node.enabled = enabled;
            node.layer = layer;
            self.pools.clone_entity(source, id)?;
            created.push(id);
        }

        let copy = created[0];
        log::debug!("cloned {base} as {copy} ({} entities)", created.len());
        Ok(copy)
    }

    /// Destroy `id` and its whole subtree, children first. Returns how many
    /// entities were destroyed.
    pub fn remove_entity(&mut self, id: EntityId) -> EcsResult<usize> {
        if id.is_root() {
            return Err(EcsError::InvalidArgument(
                "cannot remove the scene root".to_string(),
            ));
        }
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            self.node_mut(parent)?.detach_child(id);
        }
        let removed = self.destroy_subtree(id);
        log::debug!("removed entity {id} ({removed} entities)");
        Ok(removed)
    }

    /// Destroy every entity under the root. Pool registrations and systems
    /// survive. Returns how many entities were destroyed.
    pub fn clear(&mut self) -> usize {
        let removed = self.clear_children(EntityId::ROOT);
        log::debug!("cleared scene `{}` ({removed} entities)", self.root.name);
        removed
    }

    pub(crate) fn clear_children(&mut self, id: EntityId) -> usize {
        let children = match self.try_node_mut(id) {
            Some(node) => std::mem::take(&mut node.children),
            None => return 0,
        };
        children
            .into_iter()
            .map(|child| self.destroy_subtree(child))
            .sum()
    }

    /// `top` and all of its descendants, each after its parent.
    fn subtree(&self, top: EntityId) -> Vec<EntityId> {
        let mut order = vec![top];
        let mut i = 0;
        while i < order.len() {
            if let Some(node) = self.try_node(order[i]) {
                order.extend_from_slice(&node.children);
            }
            i += 1;
        }
        order
    }

    fn destroy_subtree(&mut self, top: EntityId) -> usize {
        let doomed = self.subtree(top);
        for &id in doomed.iter().rev() {
            self.destroy_node(id);
        }
        doomed.len()
    }

    fn destroy_node(&mut self, id: EntityId) {
        self.pools.unregister_entity(id);
        debug_assert!(
            !self.pools.holds_entity(id),
            "entity {id} still has component data after removal"
        );
        if let Some(slot) = self.slots.get_mut(id.index() as usize) {
            *slot = None;
        }
        self.allocator.deallocate(id);
    }

    /// Move `id` (with its subtree) to the end of `new_parent`'s children.
    ///
    /// Fails with [`EcsError::InvalidArgument`] when moving the root or when
    /// `new_parent` is `id` itself or one of its descendants.
    pub fn set_parent(&mut self, id: EntityId, new_parent: EntityId) -> EcsResult<()> {
        if id.is_root() {
            return Err(EcsError::InvalidArgument(
                "cannot re-parent the scene root".to_string(),
            ));
        }
        let old_parent = self.node(id)?.parent;
        self.node(new_parent)?;

        let mut ancestor = Some(new_parent);
        while let Some(current) = ancestor {
            if current == id {
                return Err(EcsError::InvalidArgument(format!(
                    "cannot move {id} under its own subtree ({new_parent})"
                )));
            }
            ancestor = self.try_node(current).and_then(|node| node.parent);
        }

        if old_parent == Some(new_parent) {
            return Ok(());
        }
        if let Some(old) = old_parent {
            self.node_mut(old)?.detach_child(id);
        }
        self.node_mut(new_parent)?.children.push(id);
        self.node_mut(id)?.parent = Some(new_parent);
        log::debug!("moved {id} under {new_parent}");
        Ok(())
    }

    /// Move `id` back under the root.
    pub fn detach(&mut self, id: EntityId) -> EcsResult<()> {
        self.set_parent(id, EntityId::ROOT)
    }

    /// First entity named `name`, searching depth-first from the root. The
    /// root itself never matches.
    pub fn find(&self, name: &str) -> Option<EntityRef<'_>> {
        self.root().find(name)
    }

    /// Lazily walk the descendants of `id`.
    pub fn descendants(&self, id: EntityId, traversal: Traversal) -> EcsResult<Descendants<'_>> {
        self.node(id)?;
        Ok(Descendants::new(self, id, traversal))
    }

    pub fn depth(&self, id: EntityId) -> EcsResult<usize> {
        self.node(id)?;
        Ok(self.depth_of(id))
    }

    /// Count parent hops up to the root. Not cached.
    pub(crate) fn depth_of(&self, id: EntityId) -> usize {
        let mut depth = 0;
        let mut current = self.try_node(id).and_then(|node| node.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.try_node(parent).and_then(|node| node.parent);
        }
        depth
    }

    /// Set the flag on `id` and every descendant.
    pub fn set_enabled(&mut self, id: EntityId, enabled: bool) -> EcsResult<()> {
        self.node(id)?;
        self.cascade_enabled(id, enabled);
        Ok(())
    }

    pub(crate) fn cascade_enabled(&mut self, id: EntityId, enabled: bool) {
        let subtree = self.subtree(id);
        for &each in &subtree {
            if let Some(node) = self.try_node_mut(each) {
                node.enabled = enabled;
            }
        }
        log::debug!(
            "{} {id} and {} descendants",
            if enabled { "enabled" } else { "disabled" },
            subtree.len() - 1
        );
    }

    pub fn set_layer(&mut self, id: EntityId, layer: u64) -> EcsResult<()> {
        self.node_mut(id)?.layer = layer;
        Ok(())
    }

    /// Entities whose layer shares at least one bit with `mask`, depth-first.
    pub fn entities_in_layers(&self, mask: u64) -> Vec<EntityId> {
        self.root()
            .descendants(Traversal::DepthFirst)
            .filter(|entity| entity.layer() & mask != 0)
            .map(|entity| entity.id())
            .collect()
    }

    // ── Components ───────────────────────────────────────────────────────

    /// Attach `value` to `id`, registering the pool for `T` if needed.
    pub fn add_component<T: Component>(&mut self, id: EntityId, value: T) -> EcsResult<&mut T> {
        self.node(id)?;
        self.pools.add::<T>().add(id, value)
    }

    pub fn get_component<T: Component>(&self, id: EntityId) -> EcsResult<&T> {
        self.node(id)?;
        self.pools
            .get::<T>()
            .ok_or_else(pool_not_found::<T>)?
            .get(id)
    }

    pub fn get_component_mut<T: Component>(&mut self, id: EntityId) -> EcsResult<&mut T> {
        self.node(id)?;
        self.pools
            .get_mut::<T>()
            .ok_or_else(pool_not_found::<T>)?
            .get_mut(id)
    }

    pub fn has_component<T: Component>(&self, id: EntityId) -> bool {
        self.is_alive(id) && self.pools.get::<T>().is_some_and(|pool| pool.contains(id))
    }

    /// The component's own flag, independent of the entity's.
    pub fn is_component_enabled<T: Component>(&self, id: EntityId) -> EcsResult<bool> {
        self.node(id)?;
        self.pools
            .get::<T>()
            .ok_or_else(pool_not_found::<T>)?
            .is_enabled(id)
    }

    /// Toggle one component without detaching it. Systems reading
    /// [`ComponentPool::iter_enabled`] skip it while it is off.
    pub fn set_component_enabled<T: Component>(
        &mut self,
        id: EntityId,
        enabled: bool,
    ) -> EcsResult<()> {
        self.node(id)?;
        self.pools
            .get_mut::<T>()
            .ok_or_else(pool_not_found::<T>)?
            .set_enabled(id, enabled)
    }

    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> EcsResult<T> {
        self.node(id)?;
        let name = component_name::<T>();
        let pool = self.pools.get_mut::<T>().ok_or_else(|| {
            EcsError::InvalidArgument(format!("no pool exists for component type `{name}`"))
        })?;
        if !pool.contains(id) {
            return Err(EcsError::InvalidArgument(format!(
                "entity {id} has no component of type `{name}`"
            )));
        }
        pool.remove(id)
    }

    // ── Pools ────────────────────────────────────────────────────────────

    pub fn pools(&self) -> &ComponentPools {
        &self.pools
    }

    /// Registry access for systems. Entries added through the view for ids
    /// that are not alive are discarded when it is dropped.
    pub fn pools_mut(&mut self) -> PoolsMut<'_> {
        PoolsMut::new(&mut self.pools, &self.allocator)
    }

    pub fn pool<T: Component>(&self) -> Option<&ComponentPool<T>> {
        self.pools.get::<T>()
    }

    /// Same liveness guarantee as [`pools_mut`](Self::pools_mut).
    pub fn pool_mut<T: Component>(&mut self) -> Option<PoolMut<'_, T>> {
        let pool = self.pools.get_mut::<T>()?;
        Some(PoolMut::new(pool, &self.allocator))
    }

    /// Register a pool for `T` if needed and return a view of it.
    pub fn register_pool<T: Component>(&mut self) -> PoolMut<'_, T> {
        PoolMut::new(self.pools.add::<T>(), &self.allocator)
    }

    pub fn unregister_pool<T: Component>(&mut self) -> EcsResult<ComponentPool<T>> {
        self.pools.remove::<T>()
    }

    // ── Systems ──────────────────────────────────────────────────────────

    /// Register a system at the end of the execution order. Registering a
    /// type that is already present replaces it in place.
    pub fn emplace_system<S: System>(&mut self, system: S) -> &mut S {
        self.systems.insert(system)
    }

    /// `None` while called from inside a running phase.
    pub fn get_system<S: System>(&self) -> Option<&S> {
        self.systems.get::<S>()
    }

    pub fn get_system_mut<S: System>(&mut self) -> Option<&mut S> {
        self.systems.get_mut::<S>()
    }

    pub fn has_system<S: System>(&self) -> bool {
        self.systems.contains::<S>()
    }

    pub fn remove_system<S: System>(&mut self) -> Option<S> {
        let removed = self.systems.remove::<S>();
        if removed.is_none() {
            log::warn!(
                "remove_system: `{}` is not registered",
                std::any::type_name::<S>()
            );
        }
        removed
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Short type names in execution order.
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.names()
    }

    // ── Frame phases ─────────────────────────────────────────────────────

    pub fn before_update(&mut self, dt: f32) {
        self.run_phase(Phase::BeforeUpdate, dt);
    }

    pub fn update(&mut self, dt: f32) {
        self.run_phase(Phase::Update, dt);
    }

    pub fn after_update(&mut self, dt: f32) {
        self.run_phase(Phase::AfterUpdate, dt);
    }

    /// Run all three phases and advance the frame counter.
    pub fn tick(&mut self, dt: f32) {
        for phase in Phase::ALL {
            self.run_phase(phase, dt);
        }
        self.frame_count += 1;
    }

    fn run_phase(&mut self, phase: Phase, dt: f32) {
        // Detach the schedule so each hook can borrow the scene mutably.
        let mut running = std::mem::take(&mut self.systems);
        running.run(phase, self, dt);
        let added = std::mem::replace(&mut self.systems, running);
        if !added.is_empty() {
            self.systems.absorb(added);
        }
    }

    // ── Diagnostics ──────────────────────────────────────────────────────

    /// Collect a JSON-serializable summary of the scene.
    #[cfg(feature = "diagnostics")]
    pub fn diagnostics_snapshot(&self) -> crate::diag::SceneSnapshot {
        use crate::ecs::component::short_type_name;

        let mut pools: Vec<_> = self
            .pools
            .iter()
            .map(|(_, pool)| crate::diag::PoolSnapshot {
                name: short_type_name(pool.type_name()).to_string(),
                len: pool.len(),
            })
            .collect();
        pools.sort_by(|a, b| a.name.cmp(&b.name));

        let max_depth = self
            .root()
            .descendants(Traversal::DepthFirst)
            .map(|entity| entity.depth())
            .max()
            .unwrap_or(0);

        crate::diag::SceneSnapshot {
            root_name: self.root.name.clone(),
            frame_count: self.frame_count,
            entity_count: self.allocator.alive_count(),
            total_slots: self.allocator.total_slots(),
            free_ids: self.allocator.free_count(),
            max_depth,
            pools,
            systems: self.systems.timings(),
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("root", &self.root.name)
            .field("entities", &self.entity_count())
            .field("pools", &self.pools.type_names())
            .field("systems", &self.systems.names())
            .field("frame_count", &self.frame_count)
            .finish()
    }
}

fn pool_not_found<T: Component>() -> EcsError {
    EcsError::PoolNotFound {
        component: component_name::<T>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

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

    fn bare(scene: &mut Scene, name: &str) -> EntityId {
        scene
            .new_entity(name, EntityCreationFlag::NoTransform)
            .unwrap()
            .id()
    }

    #[test]
    fn first_entity_gets_index_zero() {
        let mut scene = Scene::new();
        let a = bare(&mut scene, "a");
        let b = bare(&mut scene, "b");
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(scene.entity_count(), 2);
        assert_eq!(scene.root().children(), &[a, b]);
    }

    #[test]
    fn default_flag_attaches_transform() {
        let mut scene = Scene::new();
        let with = scene.new_entity("with", EntityCreationFlag::Default).unwrap().id();
        let without = bare(&mut scene, "without");
        assert!(scene.has_component::<Transform>(with));
        assert!(!scene.has_component::<Transform>(without));

        let mut scene = Scene::with_config(SceneConfig::default().with_attach_transform(false));
        let id = scene.new_entity("e", EntityCreationFlag::Default).unwrap().id();
        assert!(!scene.has_component::<Transform>(id));
    }

    #[test]
    fn root_name_comes_from_config() {
        let scene = Scene::with_config(SceneConfig::default().with_root_name("level"));
        assert_eq!(scene.root().name(), "level");
        assert_eq!(scene.root().depth(), 0);
        assert!(scene.root().parent().is_none());
    }

    #[test]
    fn stale_id_is_rejected_after_recycling() {
        let mut scene = Scene::new();
        let old = bare(&mut scene, "old");
        scene.add_component(old, Position { x: 1.0, y: 1.0 }).unwrap();
        scene.remove_entity(old).unwrap();

        let new = bare(&mut scene, "new");
        assert_eq!(new.index(), old.index());
        assert_ne!(new, old);
        assert_eq!(
            scene.get_entity(old).unwrap_err(),
            EcsError::EntityNotFound(old)
        );
        assert!(!scene.has_component::<Position>(new));
        assert!(scene.get_entity(new).unwrap().children().is_empty());
    }

    #[test]
    fn new_child_tracks_depth() {
        let mut scene = Scene::new();
        let a = bare(&mut scene, "a");
        let b = scene.new_child(a, "b", EntityCreationFlag::NoTransform).unwrap().id();
        let c = scene.new_child(b, "c", EntityCreationFlag::NoTransform).unwrap().id();
        assert_eq!(scene.depth(a).unwrap(), 1);
        assert_eq!(scene.depth(c).unwrap(), 3);
        assert_eq!(scene.get_entity(c).unwrap().parent(), Some(b));
    }

    #[test]
    fn new_child_of_dead_parent_fails() {
        let mut scene = Scene::new();
        let a = bare(&mut scene, "a");
        scene.remove_entity(a).unwrap();
        assert!(matches!(
            scene.new_child(a, "orphan", EntityCreationFlag::Default),
            Err(EcsError::EntityNotFound(_))
        ));
        assert_eq!(scene.entity_count(), 0);
    }

    #[test]
    fn clone_copies_subtree_and_components() {
        let mut scene = Scene::new();
        let a = bare(&mut scene, "a");
        scene.add_component(a, Position { x: 1.0, y: 2.0 }).unwrap();
        let b = scene.new_child(a, "b", EntityCreationFlag::NoTransform).unwrap().id();
        scene.add_component(b, Velocity { dx: 3.0, dy: 4.0 }).unwrap();
        scene.set_layer(b, 0b100).unwrap();

        let copy = scene.clone_entity(a, None).unwrap();
        let copy_ref = scene.get_entity(copy).unwrap();
        assert_eq!(copy_ref.name(), "a clone");
        assert_eq!(copy_ref.parent(), Some(EntityId::ROOT));
        assert_eq!(copy_ref.get_component::<Position>().unwrap(), &Position { x: 1.0, y: 2.0 });

        let copy_child = copy_ref.children()[0];
        let child_ref = scene.get_entity(copy_child).unwrap();
        assert_eq!(child_ref.name(), "b clone");
        assert_eq!(child_ref.layer(), 0b100);
        assert!(!child_ref.has_component::<Position>());
        assert_eq!(child_ref.get_component::<Velocity>().unwrap().dx, 3.0);

        // Copies are independent.
        scene.get_component_mut::<Position>(copy).unwrap().x = 9.0;
        assert_eq!(scene.get_component::<Position>(a).unwrap().x, 1.0);
    }

    #[test]
    fn clone_into_own_subtree_terminates() {
        let mut scene = Scene::new();
        let a = bare(&mut scene, "a");
        let b = scene.new_child(a, "b", EntityCreationFlag::NoTransform).unwrap().id();

        let copy = scene.clone_entity(a, Some(b)).unwrap();
        assert_eq!(scene.entity_count(), 4);
        assert_eq!(scene.get_entity(copy).unwrap().parent(), Some(b));
        assert_eq!(scene.depth(copy).unwrap(), 3);
    }

    #[test]
    fn clone_uses_configured_suffix() {
        let mut scene = Scene::with_config(SceneConfig::default().with_clone_suffix("_2"));
        let a = bare(&mut scene, "door");
        let copy = scene.clone_entity(a, None).unwrap();
        assert_eq!(scene.get_entity(copy).unwrap().name(), "door_2");
    }

    #[test]
    fn root_cannot_be_cloned_removed_or_moved() {
        let mut scene = Scene::new();
        let a = bare(&mut scene, "a");
        for result in [
            scene.clone_entity(EntityId::ROOT, None).map(|_| ()),
            scene.remove_entity(EntityId::ROOT).map(|_| ()),
            scene.set_parent(EntityId::ROOT, a),
        ] {
            assert!(matches!(result, Err(EcsError::InvalidArgument(_))));
        }
    }

    #[test]
    fn remove_entity_drops_components_bottom_up() {
        let mut scene = Scene::new();
        let a = scene.new_entity("a", EntityCreationFlag::Default).unwrap().id();
        let b = scene.new_child(a, "b", EntityCreationFlag::Default).unwrap().id();
        let keep = scene.new_entity("keep", EntityCreationFlag::Default).unwrap().id();

        assert_eq!(scene.remove_entity(a).unwrap(), 2);
        assert!(!scene.is_alive(a));
        assert!(!scene.is_alive(b));
        assert!(scene.find("b").is_none());
        assert_eq!(scene.pool::<Transform>().unwrap().entities(), &[keep]);
        assert_eq!(scene.root().children(), &[keep]);
    }

    #[test]
    fn remove_entity_on_dead_id_fails() {
        let mut scene = Scene::new();
        let a = bare(&mut scene, "a");
        scene.remove_entity(a).unwrap();
        assert_eq!(scene.remove_entity(a), Err(EcsError::EntityNotFound(a)));
    }

    #[test]
    fn clear_keeps_pools_and_systems() {
        struct Noop;
        impl System for Noop {}

        let mut scene = Scene::new();
        scene.emplace_system(Noop);
        for name in ["a", "b", "c"] {
            scene.new_entity(name, EntityCreationFlag::Default).unwrap();
        }

        assert_eq!(scene.clear(), 3);
        assert_eq!(scene.entity_count(), 0);
        assert!(scene.root().children().is_empty());
        assert!(scene.pool::<Transform>().unwrap().is_empty());
        assert!(scene.has_system::<Noop>());

        // Scene stays usable.
        let id = bare(&mut scene, "again");
        assert!(scene.is_alive(id));
    }

    #[test]
    fn find_is_depth_first_first_match() {
        let mut scene = Scene::new();
        let a = bare(&mut scene, "a");
        let deep = scene.new_child(a, "twin", EntityCreationFlag::NoTransform).unwrap().id();
        bare(&mut scene, "twin");

        assert_eq!(scene.find("twin").unwrap().id(), deep);
        assert!(scene.find("root").is_none());
        assert!(scene.find("missing").is_none());
    }

    #[test]
    fn set_parent_moves_subtree() {
        let mut scene = Scene::new();
        let a = bare(&mut scene, "a");
        let b = bare(&mut scene, "b");
        let c = scene.new_child(b, "c", EntityCreationFlag::NoTransform).unwrap().id();

        scene.set_parent(b, a).unwrap();
        assert_eq!(scene.root().children(), &[a]);
        assert_eq!(scene.get_entity(a).unwrap().children(), &[b]);
        assert_eq!(scene.depth(c).unwrap(), 3);

        scene.detach(b).unwrap();
        assert_eq!(scene.root().children(), &[a, b]);
        assert_eq!(scene.depth(c).unwrap(), 2);
    }

    #[test]
    fn set_parent_rejects_cycles() {
        let mut scene = Scene::new();
        let a = bare(&mut scene, "a");
        let b = scene.new_child(a, "b", EntityCreationFlag::NoTransform).unwrap().id();

        assert!(matches!(scene.set_parent(a, b), Err(EcsError::InvalidArgument(_))));
        assert!(matches!(scene.set_parent(a, a), Err(EcsError::InvalidArgument(_))));
        assert_eq!(scene.get_entity(b).unwrap().parent(), Some(a));
    }

    #[test]
    fn layers_filter_by_mask() {
        let mut scene = Scene::new();
        let a = bare(&mut scene, "a");
        let b = bare(&mut scene, "b");
        scene.set_layer(b, 0b10).unwrap();

        assert_eq!(scene.entities_in_layers(0b01), vec![a]);
        assert_eq!(scene.entities_in_layers(0b10), vec![b]);
        assert_eq!(scene.entities_in_layers(0b11), vec![a, b]);
    }

    #[test]
    fn component_forwarders_check_liveness() {
        let mut scene = Scene::new();
        let a = bare(&mut scene, "a");
        scene.remove_entity(a).unwrap();
        assert_eq!(
            scene.add_component(a, Position { x: 0.0, y: 0.0 }).unwrap_err(),
            EcsError::EntityNotFound(a)
        );
    }

    #[test]
    fn has_component_is_false_for_dead_ids() {
        let mut scene = Scene::new();
        let a = bare(&mut scene, "a");
        scene.add_component(a, Position { x: 0.0, y: 0.0 }).unwrap();
        scene.remove_entity(a).unwrap();
        assert!(!scene.has_component::<Position>(a));
    }

    #[test]
    fn pool_entries_for_dead_ids_are_discarded() {
        let mut scene = Scene::new();
        let a = bare(&mut scene, "a");
        let b = bare(&mut scene, "b");
        scene.remove_entity(a).unwrap();

        let added = scene
            .pools_mut()
            .add::<Position>()
            .add(a, Position { x: 7.0, y: 0.0 })
            .is_ok();
        assert!(added);
        assert_eq!(scene.pool::<Position>().unwrap().len(), 0);
        assert!(!scene.pools().holds_entity(a));

        {
            let mut pool = scene.register_pool::<Position>();
            pool.add(a, Position { x: 1.0, y: 0.0 }).unwrap();
            pool.add(b, Position { x: 2.0, y: 0.0 }).unwrap();
            pool.add(EntityId::ROOT, Position { x: 3.0, y: 0.0 }).unwrap();
        }
        let pool = scene.pool::<Position>().unwrap();
        assert_eq!(pool.len(), 2);
        assert!(pool.contains(b));
        assert!(pool.contains(EntityId::ROOT));

        scene.clear();
        assert_eq!(scene.pool::<Position>().unwrap().len(), 1);
        assert_eq!(scene.entity_count(), 0);
    }

    #[test]
    fn component_flag_toggles_independently_of_entity() {
        let mut scene = Scene::new();
        let a = bare(&mut scene, "a");
        scene.add_component(a, Position { x: 0.0, y: 0.0 }).unwrap();
        assert!(scene.is_component_enabled::<Position>(a).unwrap());

        scene.set_component_enabled::<Position>(a, false).unwrap();
        assert!(!scene.is_component_enabled::<Position>(a).unwrap());
        assert!(scene.get_entity(a).unwrap().is_enabled());
        assert_eq!(scene.pool::<Position>().unwrap().iter_enabled().count(), 0);

        let copy = scene.clone_entity(a, None).unwrap();
        assert!(!scene.is_component_enabled::<Position>(copy).unwrap());
        assert!(matches!(
            scene.set_component_enabled::<Velocity>(a, false),
            Err(EcsError::PoolNotFound { .. })
        ));
    }

    #[test]
    fn duplicate_component_is_rejected() {
        let mut scene = Scene::new();
        let a = bare(&mut scene, "a");
        scene.add_component(a, Position { x: 0.0, y: 0.0 }).unwrap();
        assert!(matches!(
            scene.add_component(a, Position { x: 5.0, y: 5.0 }),
            Err(EcsError::DuplicateComponent { .. })
        ));
        assert_eq!(scene.get_component::<Position>(a).unwrap().x, 0.0);
    }

    // ── Systems ──────────────────────────────────────────────────────────

    type Log = Rc<RefCell<Vec<String>>>;

    struct Physics(Log);
    impl System for Physics {
        fn before_update(&mut self, _scene: &mut Scene, _dt: f32) {
            self.0.borrow_mut().push("physics:before".into());
        }
        fn update(&mut self, scene: &mut Scene, dt: f32) {
            self.0.borrow_mut().push("physics:update".into());
            let mut pools = scene.pools_mut();
            let (positions, velocities) = match pools.pair_mut::<Position, Velocity>() {
                Ok(pair) => pair,
                Err(_) => return,
            };
            for (id, pos) in positions.iter_with_ids_mut() {
                if let Some(vel) = velocities.try_get(id) {
                    pos.x += vel.dx * dt;
                    pos.y += vel.dy * dt;
                }
            }
        }
        fn after_update(&mut self, _scene: &mut Scene, _dt: f32) {
            self.0.borrow_mut().push("physics:after".into());
        }
    }

    struct Render(Log);
    impl System for Render {
        fn update(&mut self, _scene: &mut Scene, _dt: f32) {
            self.0.borrow_mut().push("render:update".into());
        }
    }

    #[test]
    fn tick_runs_phases_in_registration_order() {
        let log: Log = Rc::default();
        let mut scene = Scene::new();
        scene.emplace_system(Physics(log.clone()));
        scene.emplace_system(Render(log.clone()));

        scene.tick(1.0);

        assert_eq!(
            *log.borrow(),
            vec!["physics:before", "physics:update", "render:update", "physics:after"]
        );
        assert_eq!(scene.frame_count(), 1);
        assert_eq!(scene.system_names(), vec!["Physics", "Render"]);
    }

    #[test]
    fn systems_mutate_pools() {
        let mut scene = Scene::new();
        let a = bare(&mut scene, "a");
        scene.add_component(a, Position { x: 0.0, y: 0.0 }).unwrap();
        scene.add_component(a, Velocity { dx: 2.0, dy: -1.0 }).unwrap();
        scene.emplace_system(Physics(Rc::default()));

        scene.update(0.5);
        scene.update(0.5);

        assert_eq!(scene.get_component::<Position>(a).unwrap(), &Position { x: 2.0, y: -1.0 });
        assert_eq!(scene.frame_count(), 0);
    }

    #[test]
    fn system_registered_mid_phase_runs_afterwards() {
        struct Spawner;
        impl System for Spawner {
            fn update(&mut self, scene: &mut Scene, _dt: f32) {
                assert!(scene.get_system::<Spawner>().is_none());
                scene.emplace_system(Counter(0));
            }
        }
        struct Counter(u32);
        impl System for Counter {
            fn update(&mut self, _scene: &mut Scene, _dt: f32) {
                self.0 += 1;
            }
        }

        let mut scene = Scene::new();
        scene.emplace_system(Spawner);
        scene.update(0.0);
        assert_eq!(scene.system_names(), vec!["Spawner", "Counter"]);
        assert_eq!(scene.get_system::<Counter>().unwrap().0, 0);

        scene.remove_system::<Spawner>().unwrap();
        scene.update(0.0);
        assert_eq!(scene.get_system::<Counter>().unwrap().0, 1);
    }

    #[test]
    fn systems_can_restructure_the_scene() {
        struct Reaper;
        impl System for Reaper {
            fn after_update(&mut self, scene: &mut Scene, _dt: f32) {
                if let Some(doomed) = scene.find("doomed").map(|e| e.id()) {
                    scene.remove_entity(doomed).unwrap();
                }
            }
        }

        let mut scene = Scene::new();
        bare(&mut scene, "doomed");
        scene.emplace_system(Reaper);
        scene.tick(0.016);
        assert_eq!(scene.entity_count(), 0);
    }

    #[cfg(feature = "diagnostics")]
    #[test]
    fn diagnostics_snapshot_reports_counts() {
        let mut scene = Scene::new();
        let a = scene.new_entity("a", EntityCreationFlag::Default).unwrap().id();
        scene.new_child(a, "b", EntityCreationFlag::Default).unwrap();
        scene.emplace_system(Render(Rc::default()));
        scene.tick(0.016);

        let snapshot = scene.diagnostics_snapshot();
        assert_eq!(snapshot.entity_count, 2);
        assert_eq!(snapshot.max_depth, 2);
        assert_eq!(snapshot.frame_count, 1);
        assert_eq!(snapshot.pools.len(), 1);
        assert_eq!(snapshot.pools[0].name, "Transform");
        assert_eq!(snapshot.pools[0].len, 2);
        assert_eq!(snapshot.systems[0].name, "Render");
    }
}
