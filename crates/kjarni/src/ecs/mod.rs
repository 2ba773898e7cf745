//! # Sparse-Set ECS with a Scene Tree
//!
//! Entities are ids arranged in a tree; component data lives in one packed
//! pool per type; systems run over the pools once per frame phase.
//!
//! ## Module Overview
//!
//! - [`entity`] — Generational entity IDs and the recycling allocator
//! - [`component`] — The `Component` capability trait
//! - [`pool`] — `ComponentPool<T>`, a sparse set with swap-removal
//! - [`registry`] — Type-erased map of pools
//! - [`handle`] — `EntityRef` / `EntityMut` views of one entity
//! - [`hierarchy`] — Subtree traversal
//! - [`system`] — System trait and ordered schedule

pub mod component;
pub mod entity;
pub mod handle;
pub mod hierarchy;
pub(crate) mod node;
pub mod pool;
pub mod registry;
pub mod system;

pub use component::Component;
pub use entity::{EntityAllocator, EntityId};
pub use handle::{EntityMut, EntityRef};
pub use hierarchy::{Descendants, Traversal};
pub use node::{DEFAULT_LAYER, EntityCreationFlag};
pub use pool::ComponentPool;
pub use registry::{ComponentPools, ErasedPool, PoolMut, PoolsMut};
pub use system::{Phase, Schedule, System};
