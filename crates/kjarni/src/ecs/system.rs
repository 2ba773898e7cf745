//! # System — Behavior That Runs Over the Scene
//!
//! A system is a stateful object with three optional per-frame hooks. The
//! scene calls every registered system's `before_update`, then every
//! `update`, then every `after_update`, each pass in registration order.
//!
//! ```text
//! scene.tick(dt)
//!   before_update: Physics → Audio → Render
//!   update:        Physics → Audio → Render
//!   after_update:  Physics → Audio → Render
//! ```
//!
//! At most one instance per concrete type is registered. Registering the same
//! type again replaces the old instance in place (keeping its position in the
//! order) and logs a warning.
//!
//! While a phase runs, the [`Schedule`] is detached from the scene so each
//! hook can take `&mut Scene`. Systems registered from inside a hook land in
//! a fresh schedule and are merged back, after the existing ones, when the
//! phase ends.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::scene::Scene;

/// Scene-wide behavior with per-frame hooks. Every hook defaults to a no-op.
pub trait System: 'static {
    fn before_update(&mut self, _scene: &mut Scene, _dt: f32) {}

    fn update(&mut self, _scene: &mut Scene, _dt: f32) {}

    fn after_update(&mut self, _scene: &mut Scene, _dt: f32) {}
}

/// Object-safe extension that lets a boxed system be downcast back to its type.
pub(crate) trait AnySystem: System {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<S: System> AnySystem for S {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// One of the three per-frame passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    BeforeUpdate,
    Update,
    AfterUpdate,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Phase; 3] = [Phase::BeforeUpdate, Phase::Update, Phase::AfterUpdate];

    pub fn name(self) -> &'static str {
        match self {
            Phase::BeforeUpdate => "before_update",
            Phase::Update => "update",
            Phase::AfterUpdate => "after_update",
        }
    }

    #[cfg_attr(not(feature = "diagnostics"), allow(dead_code))]
    fn index(self) -> usize {
        self as usize
    }
}

struct SystemEntry {
    name: String,
    system: Box<dyn AnySystem>,
    /// Duration of the most recent call of each phase, in microseconds.
    #[cfg(feature = "diagnostics")]
    last_us: [f64; 3],
}

impl SystemEntry {
    fn new<S: System>(system: S) -> Self {
        Self {
            name: short_system_name(std::any::type_name::<S>()),
            system: Box::new(system),
            #[cfg(feature = "diagnostics")]
            last_us: [0.0; 3],
        }
    }

    fn call(&mut self, phase: Phase, scene: &mut Scene, dt: f32) {
        #[cfg(feature = "diagnostics")]
        let start = std::time::Instant::now();

        match phase {
            Phase::BeforeUpdate => self.system.before_update(scene, dt),
            Phase::Update => self.system.update(scene, dt),
            Phase::AfterUpdate => self.system.after_update(scene, dt),
        }

        #[cfg(feature = "diagnostics")]
        {
            self.last_us[phase.index()] = start.elapsed().as_secs_f64() * 1_000_000.0;
        }
    }
}

/// Per-system timings from the most recent frame.
#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone, serde::Serialize)]
pub struct SystemTiming {
    pub name: String,
    pub before_update_us: f64,
    pub update_us: f64,
    pub after_update_us: f64,
}

/// Registered systems, at most one per type, in registration order.
#[derive(Default)]
pub struct Schedule {
    systems: HashMap<TypeId, SystemEntry>,
    order: Vec<TypeId>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `system`, replacing any existing instance of the same type.
    pub fn insert<S: System>(&mut self, system: S) -> &mut S {
        let tid = TypeId::of::<S>();
        let entry = SystemEntry::new(system);
        match self.systems.get_mut(&tid) {
            Some(existing) => {
                log::warn!("system `{}` already registered, replacing it", entry.name);
                existing.system = entry.system;
            }
            None => {
                log::debug!("registered system `{}`", entry.name);
                self.order.push(tid);
                self.systems.insert(tid, entry);
            }
        }
        self.get_mut::<S>().unwrap_or_else(|| {
            panic!(
                "system `{}` missing right after insert",
                std::any::type_name::<S>()
            )
        })
    }

    pub fn get<S: System>(&self) -> Option<&S> {
        self.systems
            .get(&TypeId::of::<S>())
            .and_then(|entry| entry.system.as_any().downcast_ref())
    }

    pub fn get_mut<S: System>(&mut self) -> Option<&mut S> {
        self.systems
            .get_mut(&TypeId::of::<S>())
            .and_then(|entry| entry.system.as_any_mut().downcast_mut())
    }

    pub fn contains<S: System>(&self) -> bool {
        self.systems.contains_key(&TypeId::of::<S>())
    }

    /// Unregister the system of type `S`, handing it back.
    pub fn remove<S: System>(&mut self) -> Option<S> {
        let tid = TypeId::of::<S>();
        let entry = self.systems.remove(&tid)?;
        self.order.retain(|&t| t != tid);
        log::debug!("unregistered system `{}`", entry.name);
        entry.system.into_any().downcast::<S>().ok().map(|boxed| *boxed)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Short type names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter_map(|tid| self.systems.get(tid))
            .map(|entry| entry.name.as_str())
            .collect()
    }

    /// Run one phase of every system, in order.
    pub(crate) fn run(&mut self, phase: Phase, scene: &mut Scene, dt: f32) {
        log::trace!("running {} over {} systems", phase.name(), self.order.len());
        let Self { systems, order } = self;
        for tid in order.iter() {
            if let Some(entry) = systems.get_mut(tid) {
                entry.call(phase, scene, dt);
            }
        }
    }

    /// Merge systems registered while this schedule was detached. A type
    /// present in both keeps its slot but takes the newer instance.
    pub(crate) fn absorb(&mut self, mut other: Schedule) {
        for tid in other.order.drain(..) {
            let Some(entry) = other.systems.remove(&tid) else {
                continue;
            };
            match self.systems.get_mut(&tid) {
                Some(existing) => {
                    log::warn!("system `{}` already registered, replacing it", entry.name);
                    existing.system = entry.system;
                }
                None => {
                    self.order.push(tid);
                    self.systems.insert(tid, entry);
                }
            }
        }
    }

    #[cfg(feature = "diagnostics")]
    pub fn timings(&self) -> Vec<SystemTiming> {
        self.order
            .iter()
            .filter_map(|tid| self.systems.get(tid))
            .map(|entry| SystemTiming {
                name: entry.name.clone(),
                before_update_us: entry.last_us[Phase::BeforeUpdate.index()],
                update_us: entry.last_us[Phase::Update.index()],
                after_update_us: entry.last_us[Phase::AfterUpdate.index()],
            })
            .collect()
    }
}

/// Strip the module path from a fully-qualified type name, keeping generic
/// arguments (e.g. `game::systems::Physics` → `Physics`).
fn short_system_name(full: &str) -> String {
    crate::ecs::component::short_type_name(full).to_string()
}
