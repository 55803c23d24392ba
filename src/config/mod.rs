//! Configuration management
//!
//! Handles loading, validation, and merging of configuration from:
//! - TOML files
//! - CLI arguments
//!
//! Every section and field has a default, so an empty file is a valid
//! configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod types;

pub use types::{InputConfig, LoggingConfig, DEFAULT_PRESETS};

use crate::control::{MotionMode, SENSITIVITY_MAX, SENSITIVITY_MIN};
use crate::motion::{CurveConfig, MotionConfig, SmoothingConfig};
use crate::scheduler::{RealtimeConfig, SchedulerConfig, SchedulingVariant};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Motion calibration and startup state
    #[serde(default)]
    pub motion: MotionConfig,
    /// Curved mode path shape
    #[serde(default)]
    pub curve: CurveConfig,
    /// Smoothed mode boost
    #[serde(default)]
    pub smoothing: SmoothingConfig,
    /// Tick cadence
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Motion thread priority and affinity
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Control input
    #[serde(default)]
    pub input: InputConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, else from the default location if a file
    /// exists there, else built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(path),
                _ => Self::default_config(),
            },
        }
    }

    /// `$XDG_CONFIG_HOME/lamco-motion/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lamco-motion").join("config.toml"))
    }

    /// Create default configuration
    pub fn default_config() -> Result<Self> {
        Ok(Self::default())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let motion = &self.motion;
        if !(motion.max_speed_px_per_sec.is_finite() && motion.max_speed_px_per_sec > 0.0) {
            anyhow::bail!(
                "max_speed_px_per_sec must be positive, got {}",
                motion.max_speed_px_per_sec
            );
        }
        if !(motion.dt_cap_ms.is_finite() && motion.dt_cap_ms > 0.0) {
            anyhow::bail!("dt_cap_ms must be positive, got {}", motion.dt_cap_ms);
        }
        if !(SENSITIVITY_MIN..=SENSITIVITY_MAX).contains(&motion.initial_sensitivity) {
            anyhow::bail!(
                "initial_sensitivity ({}) must be between {} and {}",
                motion.initial_sensitivity,
                SENSITIVITY_MIN,
                SENSITIVITY_MAX
            );
        }

        if self.curve.steps == 0 {
            anyhow::bail!("curve.steps must be at least 1");
        }

        let smoothing = &self.smoothing;
        if !(smoothing.feedback_gain.is_finite() && smoothing.feedback_gain >= 0.0) {
            anyhow::bail!(
                "smoothing.feedback_gain must be non-negative, got {}",
                smoothing.feedback_gain
            );
        }
        if !(smoothing.max_boost.is_finite() && smoothing.max_boost >= 0.0) {
            anyhow::bail!(
                "smoothing.max_boost must be non-negative, got {}",
                smoothing.max_boost
            );
        }

        if self.scheduler.variant == SchedulingVariant::Deadline
            && self.scheduler.tick_period_us == 0
        {
            anyhow::bail!("scheduler.tick_period_us must be non-zero for deadline pacing");
        }

        if !(1..=99).contains(&self.realtime.rt_priority) {
            anyhow::bail!(
                "realtime.rt_priority ({}) must be between 1 and 99",
                self.realtime.rt_priority
            );
        }

        if self.input.poll_interval_ms == 0 {
            anyhow::bail!("input.poll_interval_ms must be non-zero");
        }
        if !(self.input.fine_step.is_finite() && self.input.fine_step > 0.0) {
            anyhow::bail!("input.fine_step must be positive, got {}", self.input.fine_step);
        }
        if let Some(bad) = self
            .input
            .presets
            .iter()
            .find(|p| !(SENSITIVITY_MIN..=SENSITIVITY_MAX).contains(*p))
        {
            anyhow::bail!(
                "Preset {} is outside {}..={}",
                bad,
                SENSITIVITY_MIN,
                SENSITIVITY_MAX
            );
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Invalid log level: {}", self.logging.level),
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_overrides(
        mut self,
        sensitivity: Option<f64>,
        mode: Option<MotionMode>,
        variant: Option<SchedulingVariant>,
    ) -> Self {
        if let Some(sensitivity) = sensitivity {
            self.motion.initial_sensitivity = sensitivity;
        }
        if let Some(mode) = mode {
            self.motion.initial_mode = mode;
        }
        if let Some(variant) = variant {
            self.scheduler.variant = variant;
        }

        self
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
