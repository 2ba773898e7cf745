//! # Entity Handles — Borrowed Views of One Entity
//!
//! [`EntityRef`] and [`EntityMut`] pair an [`EntityId`] with a borrow of the
//! [`Scene`]. They are only handed out for live entities, and the borrow keeps
//! the entity alive for as long as the handle exists, so every accessor is
//! infallible with respect to the entity itself.
//!
//! ```ignore
//! let mut player = scene.new_entity("player", EntityCreationFlag::Default)?;
//! player.add_component(Health(100))?;
//! let sword = player.emplace_back("sword")?.id();
//! ```
//!
//! # Panics
//!
//! Structural accessors panic if the entity vanished while the handle was
//! alive. The borrow checker rules that out for code outside this crate, so a
//! panic there points at a bug in the scene itself.

use super::component::Component;
use super::entity::EntityId;
use super::hierarchy::{Descendants, Traversal};
use super::node::{EntityCreationFlag, EntityNode};
use crate::error::EcsResult;
use crate::scene::Scene;

/// Read-only handle to a live entity.
#[derive(Clone, Copy)]
pub struct EntityRef<'s> {
    scene: &'s Scene,
    id: EntityId,
}

impl<'s> EntityRef<'s> {
    pub(crate) fn new(scene: &'s Scene, id: EntityId) -> Self {
        Self { scene, id }
    }

    fn node(&self) -> &'s EntityNode {
        self.scene
            .try_node(self.id)
            .unwrap_or_else(|| panic!("entity handle {} outlived its entity", self.id))
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn scene(&self) -> &'s Scene {
        self.scene
    }

    pub fn name(&self) -> &'s str {
        &self.node().name
    }

    /// This node's own flag. See [`EntityMut::disable`] for how the flag
    /// propagates.
    pub fn is_enabled(&self) -> bool {
        self.node().enabled
    }

    pub fn is_root(&self) -> bool {
        self.id.is_root()
    }

    /// `None` for the root.
    pub fn parent(&self) -> Option<EntityId> {
        self.node().parent
    }

    /// Children in insertion order.
    pub fn children(&self) -> &'s [EntityId] {
        &self.node().children
    }

    pub fn child_count(&self) -> usize {
        self.node().children.len()
    }

    /// Hops from the root (the root is 0, its children 1).
    pub fn depth(&self) -> usize {
        self.scene.depth_of(self.id)
    }

    pub fn layer(&self) -> u64 {
        self.node().layer
    }

    pub fn get_component<T: Component>(&self) -> EcsResult<&'s T> {
        self.scene.get_component::<T>(self.id)
    }

    pub fn has_component<T: Component>(&self) -> bool {
        self.scene.has_component::<T>(self.id)
    }

    pub fn is_component_enabled<T: Component>(&self) -> EcsResult<bool> {
        self.scene.is_component_enabled::<T>(self.id)
    }

    /// First descendant named `name`, depth-first.
    pub fn find(&self, name: &str) -> Option<EntityRef<'s>> {
        self.descendants(Traversal::DepthFirst)
            .find(|entity| entity.name() == name)
    }

    pub fn descendants(&self, traversal: Traversal) -> Descendants<'s> {
        Descendants::new(self.scene, self.id, traversal)
    }
}

impl std::fmt::Debug for EntityRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRef")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish()
    }
}

/// Mutating handle to a live entity. Holds the scene exclusively.
pub struct EntityMut<'s> {
    scene: &'s mut Scene,
    id: EntityId,
}

impl<'s> EntityMut<'s> {
    pub(crate) fn new(scene: &'s mut Scene, id: EntityId) -> Self {
        Self { scene, id }
    }

    fn node_mut(&mut self) -> &mut EntityNode {
        let id = self.id;
        self.scene
            .try_node_mut(id)
            .unwrap_or_else(|| panic!("entity handle {id} outlived its entity"))
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Reborrow as a read-only handle.
    pub fn as_readonly(&self) -> EntityRef<'_> {
        EntityRef::new(&*self.scene, self.id)
    }

    pub fn scene(&mut self) -> &mut Scene {
        self.scene
    }

    /// Release the handle and keep the scene borrow.
    pub fn into_scene(self) -> &'s mut Scene {
        self.scene
    }

    pub fn name(&self) -> &str {
        self.as_readonly().name()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.node_mut().name = name.into();
    }

    pub fn is_enabled(&self) -> bool {
        self.as_readonly().is_enabled()
    }

    /// Enable this entity and every descendant.
    pub fn enable(&mut self) {
        self.set_enabled(true);
    }

    /// Disable this entity and every descendant.
    ///
    /// The cascade is pushed down now. A descendant attached later keeps
    /// its own flag, and re-enabling a child of a disabled node leaves the
    /// rest of the subtree untouched.
    pub fn disable(&mut self) {
        self.set_enabled(false);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.scene.cascade_enabled(self.id, enabled);
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.as_readonly().parent()
    }

    pub fn children(&self) -> &[EntityId] {
        self.as_readonly().children()
    }

    pub fn child_count(&self) -> usize {
        self.as_readonly().child_count()
    }

    pub fn depth(&self) -> usize {
        self.as_readonly().depth()
    }

    pub fn layer(&self) -> u64 {
        self.as_readonly().layer()
    }

    pub fn set_layer(&mut self, layer: u64) {
        self.node_mut().layer = layer;
    }

    pub fn add_component<T: Component>(&mut self, value: T) -> EcsResult<&mut T> {
        self.scene.add_component(self.id, value)
    }

    /// Builder form of [`add_component`](Self::add_component).
    pub fn with<T: Component>(mut self, value: T) -> EcsResult<Self> {
        self.add_component(value)?;
        Ok(self)
    }

    pub fn get_component<T: Component>(&self) -> EcsResult<&T> {
        self.scene.get_component::<T>(self.id)
    }

    pub fn get_component_mut<T: Component>(&mut self) -> EcsResult<&mut T> {
        self.scene.get_component_mut::<T>(self.id)
    }

    pub fn has_component<T: Component>(&self) -> bool {
        self.scene.has_component::<T>(self.id)
    }

    pub fn remove_component<T: Component>(&mut self) -> EcsResult<T> {
        self.scene.remove_component::<T>(self.id)
    }

    pub fn set_component_enabled<T: Component>(&mut self, enabled: bool) -> EcsResult<()> {
        self.scene.set_component_enabled::<T>(self.id, enabled)
    }

    /// Create a child with the default creation flag.
    pub fn emplace_back(&mut self, name: &str) -> EcsResult<EntityMut<'_>> {
        self.emplace_back_with(name, EntityCreationFlag::Default)
    }

    pub fn emplace_back_with(
        &mut self,
        name: &str,
        flag: EntityCreationFlag,
    ) -> EcsResult<EntityMut<'_>> {
        self.scene.new_child(self.id, name, flag)
    }

    /// Destroy every descendant. Returns how many entities were destroyed.
    pub fn clear(&mut self) -> usize {
        self.scene.clear_children(self.id)
    }

    pub fn find(&self, name: &str) -> Option<EntityId> {
        self.as_readonly().find(name).map(|entity| entity.id())
    }

    pub fn descendants(&self, traversal: Traversal) -> Descendants<'_> {
        Descendants::new(&*self.scene, self.id, traversal)
    }

    pub fn set_parent(&mut self, new_parent: EntityId) -> EcsResult<()> {
        self.scene.set_parent(self.id, new_parent)
    }

    /// Remove this entity and its subtree. Returns how many entities were
    /// destroyed.
    pub fn despawn(self) -> EcsResult<usize> {
        self.scene.remove_entity(self.id)
    }
}

impl std::fmt::Debug for EntityMut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityMut")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish()
    }
}
