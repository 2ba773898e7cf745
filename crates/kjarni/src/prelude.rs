//! Common imports: `use kjarni::prelude::*`.

pub use crate::config::SceneConfig;
pub use crate::ecs::{
    Component, ComponentPool, ComponentPools, EntityCreationFlag, EntityId, EntityMut, EntityRef,
    Phase, PoolMut, PoolsMut, System, Traversal,
};
pub use crate::error::{EcsError, EcsResult};
pub use crate::math::{GlobalTransform, Mat4, Quat, Transform, TransformPropagation, Vec2, Vec3};
pub use crate::scene::Scene;
