//! Scene-tree node records.
//!
//! A node holds identity and tree links only. Component data lives in the
//! pools, and parent/child links are plain [`EntityId`]s into the scene's
//! arena, never references.

use super::entity::EntityId;

/// Layer mask given to new entities.
pub const DEFAULT_LAYER: u64 = 1;

/// Options for [`Scene::new_entity`](crate::scene::Scene::new_entity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityCreationFlag {
    /// Attach a default [`Transform`](crate::math::Transform) (if the scene
    /// config allows it).
    #[default]
    Default,
    /// Create the entity with no components at all.
    NoTransform,
}

#[derive(Debug, Clone)]
pub(crate) struct EntityNode {
    pub(crate) id: EntityId,
    pub(crate) name: String,
    pub(crate) enabled: bool,
    /// `None` only for the root.
    pub(crate) parent: Option<EntityId>,
    pub(crate) children: Vec<EntityId>,
    pub(crate) layer: u64,
}

impl EntityNode {
    pub(crate) fn new(id: EntityId, name: String, parent: Option<EntityId>) -> Self {
        Self {
            id,
            name,
            enabled: true,
            parent,
            children: Vec::new(),
            layer: DEFAULT_LAYER,
        }
    }

    pub(crate) fn root(name: String) -> Self {
        Self::new(EntityId::ROOT, name, None)
    }

    pub(crate) fn detach_child(&mut self, child: EntityId) {
        self.children.retain(|&c| c != child);
    }
}
