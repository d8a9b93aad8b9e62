use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_WALK_SPEED: f32 = 200.0;
pub const DEFAULT_RUN_SPEED: f32 = 500.0;
pub const DEFAULT_CAST_WALK_SPEED: f32 = 50.0;
pub const DEFAULT_CAST_TIME: f32 = 2.0;

/// Movement tunables read by the states when they configure the facade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MachineConfig {
    pub walking_speed: f32,
    pub running_speed: f32,
    pub cast_walk_speed: f32,
    /// Max speed while shuffling behind a raised shield.
    pub guard_walk_speed: f32,
    /// Seconds a cast takes. The machine never reads a clock; the owner's
    /// timer calls `finish_cast` once this has elapsed.
    pub cast_time: f32,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            walking_speed: DEFAULT_WALK_SPEED,
            running_speed: DEFAULT_RUN_SPEED,
            cast_walk_speed: DEFAULT_CAST_WALK_SPEED,
            guard_walk_speed: DEFAULT_CAST_WALK_SPEED,
            cast_time: DEFAULT_CAST_TIME,
        }
    }
}

impl MachineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("walking_speed", self.walking_speed)?;
        positive("running_speed", self.running_speed)?;
        positive("cast_walk_speed", self.cast_walk_speed)?;
        positive("guard_walk_speed", self.guard_walk_speed)?;
        positive("cast_time", self.cast_time)?;
        Ok(())
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}

pub(crate) fn positive(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}
