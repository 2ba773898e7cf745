//! Scene construction options.
//!
//! Everything has a default, so `SceneConfig::default()` (or a JSON object with
//! any subset of the fields) is always a valid configuration.
//!
//! ```ignore
//! let config = SceneConfig::default()
//!     .with_root_name("level_1")
//!     .with_entity_capacity(4096);
//! let scene = Scene::with_config(config);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{EcsError, EcsResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Name given to the scene root.
    pub root_name: String,
    /// Entity slots to reserve up front.
    pub entity_capacity: usize,
    /// Attach a default `Transform` to entities created with
    /// [`EntityCreationFlag::Default`](crate::ecs::EntityCreationFlag::Default).
    pub attach_transform: bool,
    /// Appended to the name of every cloned entity.
    pub clone_suffix: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            root_name: "root".to_string(),
            entity_capacity: 0,
            attach_transform: true,
            clone_suffix: " clone".to_string(),
        }
    }
}

impl SceneConfig {
    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }

    pub fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.entity_capacity = capacity;
        self
    }

    pub fn with_attach_transform(mut self, attach: bool) -> Self {
        self.attach_transform = attach;
        self
    }

    pub fn with_clone_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.clone_suffix = suffix.into();
        self
    }

    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> EcsResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EcsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> EcsResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| EcsError::InvalidConfig(e.to_string()))
    }

    fn validate(&self) -> EcsResult<()> {
        if self.root_name.is_empty() {
            return Err(EcsError::InvalidConfig("root_name must not be empty".into()));
        }
        if self.entity_capacity > u32::MAX as usize {
            return Err(EcsError::InvalidConfig(format!(
                "entity_capacity {} exceeds the id space",
                self.entity_capacity
            )));
        }
        Ok(())
    }
}
