//! # Entity Hierarchies — Walking the Scene Tree
//!
//! Every entity except the root has exactly one parent and appears exactly once
//! in that parent's child list. [`Descendants`] walks a subtree lazily in one of
//! two deterministic orders:
//!
//! ```text
//!        root
//!       /    \
//!      A      B
//!     / \      \
//!    C   D      E
//!
//! DepthFirst   (pre-order): A C D B E
//! BreadthFirst (level):     A B C D E
//! ```
//!
//! Children are always visited in insertion order. Systems that resolve
//! overlaps (input dispatch, collision) rely on this being stable.
//!
//! ## Usage
//!
//! ```ignore
//! for entity in scene.descendants(EntityId::ROOT, Traversal::BreadthFirst)? {
//!     println!("{} at depth {}", entity.name(), entity.depth());
//! }
//! ```

use std::collections::VecDeque;

use super::entity::EntityId;
use super::handle::EntityRef;
use crate::scene::Scene;

/// Order in which [`Descendants`] visits a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Traversal {
    /// Pre-order: a node, then its whole first child subtree, and so on.
    #[default]
    DepthFirst,
    /// Level by level, each level left to right.
    BreadthFirst,
}

/// Lazy iterator over the descendants of an entity (the entity itself is not
/// yielded).
pub struct Descendants<'s> {
    scene: &'s Scene,
    traversal: Traversal,
    pending: VecDeque<EntityId>,
}

impl<'s> Descendants<'s> {
    pub(crate) fn new(scene: &'s Scene, start: EntityId, traversal: Traversal) -> Self {
        let pending: VecDeque<EntityId> = scene
            .try_node(start)
            .map(|node| node.children.iter().copied().collect())
            .unwrap_or_default();
        Self {
            scene,
            traversal,
            pending,
        }
    }
}

impl<'s> Iterator for Descendants<'s> {
    type Item = EntityRef<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.pending.pop_front()?;
        if let Some(node) = self.scene.try_node(id) {
            match self.traversal {
                Traversal::DepthFirst => {
                    for &child in node.children.iter().rev() {
                        self.pending.push_front(child);
                    }
                }
                Traversal::BreadthFirst => self.pending.extend(node.children.iter().copied()),
            }
        }
        Some(EntityRef::new(self.scene, id))
    }
}
