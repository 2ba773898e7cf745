//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly. [`Transform`] is the default spatial component that
//! [`Scene::new_entity`](crate::scene::Scene::new_entity) attaches, and
//! [`TransformPropagation`] turns local transforms into world-space
//! [`GlobalTransform`]s by walking the scene tree.

use std::collections::VecDeque;

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::ecs::{Component, EntityId, System};
use crate::scene::Scene;

/// A 3D transform: position, rotation, and scale, relative to the parent.
///
/// Works for both 2D and 3D; 2D entities just ignore the Z axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform (origin, no rotation, uniform scale of 1).
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: Vec3::new(x, y, z),
            ..Self::IDENTITY
        }
    }

    /// 2D position (z = 0).
    pub fn from_xy(x: f32, y: f32) -> Self {
        Self::from_xyz(x, y, 0.0)
    }

    /// Return a copy with uniform scale applied.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Compute the 4x4 model matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Component for Transform {}

/// World-space transform written by [`propagate_transforms`].
///
/// For top-level entities this equals the local [`Transform`]. For children
/// it is `parent_global * child_local`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalTransform {
    pub matrix: Mat4,
}

impl GlobalTransform {
    pub fn translation(&self) -> Vec3 {
        self.matrix.col(3).truncate()
    }
}

impl Component for GlobalTransform {}

/// Propagate local transforms down the scene tree.
///
/// Traversal is breadth-first so parents are computed before children.
/// Entities without a [`Transform`] act as identity. Disabled subtrees are
/// skipped and keep their last computed value.
pub fn propagate_transforms(scene: &mut Scene) {
    let mut updates = Vec::new();
    let mut queue: VecDeque<(EntityId, Mat4)> = VecDeque::new();
    queue.push_back((EntityId::ROOT, Mat4::IDENTITY));

    while let Some((id, parent_matrix)) = queue.pop_front() {
        let Ok(entity) = scene.get_entity(id) else {
            continue;
        };
        if !entity.is_enabled() {
            continue;
        }
        let local = entity
            .get_component::<Transform>()
            .map(Transform::matrix)
            .unwrap_or(Mat4::IDENTITY);
        let global = parent_matrix * local;
        if !entity.is_root() {
            updates.push((id, global));
        }
        queue.extend(entity.children().iter().map(|&child| (child, global)));
    }

    let mut pool = scene.register_pool::<GlobalTransform>();
    for (id, matrix) in updates {
        if let Some(global) = pool.try_get_mut(id) {
            global.matrix = matrix;
        } else if let Err(err) = pool.add(id, GlobalTransform { matrix }) {
            log::warn!("transform propagation skipped {id}: {err}");
        }
    }
}

/// Runs [`propagate_transforms`] at the end of every frame.
#[derive(Debug, Default)]
pub struct TransformPropagation;

impl System for TransformPropagation {
    fn after_update(&mut self, scene: &mut Scene, _dt: f32) {
        propagate_transforms(scene);
    }
}
