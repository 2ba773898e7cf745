//! # Kjarni — Scene-Tree ECS Core
//!
//! A small Entity Component System built around a scene tree. Entities are
//! generational ids arranged under a root node, each component type lives in
//! its own packed [`ComponentPool`](ecs::ComponentPool), and
//! [`System`](ecs::System)s run in registration order across three frame
//! phases.
//!
//! Start with `use kjarni::prelude::*` and build a [`Scene`](scene::Scene).
//!
//! ```ignore
//! let mut scene = Scene::new();
//! let player = scene
//!     .new_entity("player", EntityCreationFlag::Default)?
//!     .with(Health(100))?
//!     .id();
//! scene.emplace_system(TransformPropagation);
//! scene.tick(1.0 / 60.0);
//! ```

pub mod config;
pub mod diag;
pub mod ecs;
pub mod error;
pub mod math;
pub mod prelude;
pub mod scene;
