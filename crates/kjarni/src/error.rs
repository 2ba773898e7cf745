//! # Errors
//!
//! Every structural failure in the ECS core is surfaced as an [`EcsError`].
//! Operating on a dead or recycled [`EntityId`] is always a loud, recoverable
//! error: a stale handle must never silently alias a newer entity.

use thiserror::Error;

use crate::ecs::EntityId;

/// Errors returned by scene, registry, and pool operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The id does not name a live entity (never allocated, removed, or
    /// recycled under a newer generation).
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// A pool exists for the component type but holds no entry for the entity.
    #[error("entity {entity} has no `{component}` component")]
    ComponentNotFound {
        /// The entity that was looked up.
        entity: EntityId,
        /// Type name of the component.
        component: &'static str,
    },

    /// No pool is registered for the component type.
    #[error("no pool registered for component `{component}`")]
    PoolNotFound {
        /// Type name of the component.
        component: &'static str,
    },

    /// The entity already holds a component of this type.
    #[error("entity {entity} already has a `{component}` component")]
    DuplicateComponent {
        /// The entity the component was attached to.
        entity: EntityId,
        /// Type name of the component.
        component: &'static str,
    },

    /// A structurally invalid request (removing the root, cyclic re-parenting,
    /// removing a component the entity does not hold, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Every fresh slot index has been handed out. The last index is
    /// reserved for the scene root.
    #[error("entity ids exhausted after {0} slots")]
    IdsExhausted(u32),

    /// A scene configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;
