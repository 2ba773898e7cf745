//! Diagnostics: logger setup and scene snapshots.
//!
//! [`init_logger`] installs an `env_logger` backend for the `log` facade the
//! crate logs through. With the `diagnostics` feature (on by default),
//! [`Scene::diagnostics_snapshot`](crate::scene::Scene::diagnostics_snapshot)
//! also collects a [`SceneSnapshot`] that serializes to JSON for external
//! tooling.

#[cfg(feature = "diagnostics")]
use serde::Serialize;

/// Install an `env_logger` logger configured from `RUST_LOG`, defaulting to
/// `info`. Calling it again after a logger is set is a no-op.
pub fn init_logger() {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Info).parse_default_env();
    if builder.try_init().is_err() {
        log::debug!("logger already installed");
    }
}

// ── Snapshot types (wire format) ────────────────────────────────────────

#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone, Serialize)]
pub struct SceneSnapshot {
    pub root_name: String,
    pub frame_count: u64,
    pub entity_count: usize,
    pub total_slots: u32,
    pub free_ids: usize,
    pub max_depth: usize,
    pub pools: Vec<PoolSnapshot>,
    pub systems: Vec<crate::ecs::system::SystemTiming>,
}

#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone, Serialize)]
pub struct PoolSnapshot {
    pub name: String,
    pub len: usize,
}

#[cfg(feature = "diagnostics")]
impl SceneSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
