//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::control::DEFAULT_FINE_STEP;

/// Sensitivity presets reachable by index from the console
pub const DEFAULT_PRESETS: [f64; 8] = [
    0.8571, 1.408, 1.15, 1.89965, 1.72225, 12.89035, 1.35955, 2.29865,
];

/// Control input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// How often queued commands are applied (ms)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Step for `+` / `-` adjustments
    #[serde(default = "default_fine_step")]
    pub fine_step: f64,

    /// Preset table (the console numbers them from 1)
    #[serde(default = "default_presets")]
    pub presets: Vec<f64>,
}

fn default_poll_interval_ms() -> u64 {
    10
}

fn default_fine_step() -> f64 {
    DEFAULT_FINE_STEP
}

fn default_presets() -> Vec<f64> {
    DEFAULT_PRESETS.to_vec()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            fine_step: default_fine_step(),
            presets: default_presets(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level ("trace", "debug", "info", "warn", "error")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files (None = console only)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: None,
        }
    }
}
