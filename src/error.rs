//! Error types for configuration and script loading.
//!
//! State-machine operations themselves are total and never fail; only the
//! surfaces that read external data return these.

use std::path::PathBuf;

/// Errors raised while loading or validating [`MachineConfig`](crate::config::MachineConfig)
/// or [`SimConfig`](crate::sim::SimConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be a positive finite number, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised while loading an input script for the demo simulation.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse script: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("script addresses character {index}, but only {count} exist")]
    UnknownCharacter { index: usize, count: usize },
}
