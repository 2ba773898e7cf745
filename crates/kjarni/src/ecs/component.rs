//! # Component — Plain Data Attached to Entities
//!
//! Components are payloads: a `Position`, a `Health`, a `Sprite`. They live in
//! one [`ComponentPool`](super::pool::ComponentPool) per type, never on the
//! entity itself.
//!
//! Every component can be cloned (subtree cloning copies component data) and
//! carries an enabled flag of its own, independent of its entity's flag. The
//! flag is stored next to the value in the pool, so any type gets it for free:
//!
//! ```ignore
//! #[derive(Clone)]
//! struct Collider { radius: f32 }
//! impl Component for Collider {}
//!
//! scene.add_component(wall, Collider { radius: 2.0 })?;
//! scene.set_component_enabled::<Collider>(wall, false)?;
//! assert_eq!(scene.pool::<Collider>().unwrap().iter_enabled().count(), 0);
//! ```
//!
//! Systems use
//! [`ComponentPool::iter_enabled`](super::pool::ComponentPool::iter_enabled) to
//! skip disabled data without detaching it.

use std::any::TypeId;

/// Capability every component type provides.
///
/// The per-component enabled flag lives in the owning
/// [`ComponentPool`](super::pool::ComponentPool), see
/// [`ComponentPool::set_enabled`](super::pool::ComponentPool::set_enabled).
pub trait Component: Clone + 'static {}

/// Type tag used to key pools in the registry.
pub(crate) fn component_type_id<T: Component>() -> TypeId {
    TypeId::of::<T>()
}

/// Full type name, used in error messages.
pub(crate) fn component_name<T: Component>() -> &'static str {
    std::any::type_name::<T>()
}

/// Strip the module path (e.g. `kjarni::math::Transform` → `Transform`).
pub(crate) fn short_type_name(full: &str) -> &str {
    match full.find('<') {
        Some(angle) => {
            let prefix = &full[..angle];
            let start = prefix.rfind("::").map_or(0, |i| i + 2);
            &full[start..]
        }
        None => full.rsplit("::").next().unwrap_or(full),
    }
}
