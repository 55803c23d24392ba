//! Atomic control state and its mutation surface

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::mode::MotionMode;
use super::status::StatusReport;
use super::{clamp_sensitivity, DEFAULT_FINE_STEP, DEFAULT_SENSITIVITY};
use crate::output::StatusDisplay;

/// Fine adjustments land on this grid (the display precision)
const ADJUST_GRID: f64 = 1e7;

/// Per-tick copy of the control fields
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSnapshot {
    /// Master switch
    pub enabled: bool,
    /// Externally sampled trigger condition
    pub trigger_active: bool,
    /// Sensitivity, already clamped
    pub sensitivity: f64,
    /// Synthesis mode
    pub mode: MotionMode,
}

impl ControlSnapshot {
    /// Motion is emitted only while enabled and triggered
    pub fn is_engaged(&self) -> bool {
        self.enabled && self.trigger_active
    }
}

/// Shared control state
///
/// Written by the input collaborator, read by the motion scheduler.
pub struct ControlState {
    enabled: AtomicBool,
    trigger_active: AtomicBool,
    sensitivity_bits: AtomicU64,
    mode: AtomicU8,
    running: AtomicBool,

    /// Preset sensitivity table
    presets: Vec<f64>,

    /// Step used by increase/decrease
    fine_step: f64,

    /// Receives a report after every presentable change
    display: Option<Arc<dyn StatusDisplay>>,
}

impl ControlState {
    /// Create a disabled, idle control state
    pub fn new(sensitivity: f64, mode: MotionMode) -> Self {
        let sensitivity = clamp_sensitivity(sensitivity).unwrap_or(DEFAULT_SENSITIVITY);
        Self {
            enabled: AtomicBool::new(false),
            trigger_active: AtomicBool::new(false),
            sensitivity_bits: AtomicU64::new(sensitivity.to_bits()),
            mode: AtomicU8::new(mode.to_u8()),
            running: AtomicBool::new(true),
            presets: Vec::new(),
            fine_step: DEFAULT_FINE_STEP,
            display: None,
        }
    }

    /// Set the preset table
    pub fn with_presets(mut self, presets: Vec<f64>) -> Self {
        self.presets = presets;
        self
    }

    /// Set the fine-adjustment step
    pub fn with_fine_step(mut self, step: f64) -> Self {
        self.fine_step = step.abs();
        self
    }

    /// Attach a status display
    pub fn with_display(mut self, display: Arc<dyn StatusDisplay>) -> Self {
        self.display = Some(display);
        self
    }

    /// Set the initial enabled flag without a refresh
    pub fn with_enabled(self, enabled: bool) -> Self {
        self.enabled.store(enabled, Ordering::Relaxed);
        self
    }

    /// Copy every field out at once
    pub fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot {
            enabled: self.enabled(),
            trigger_active: self.trigger_active(),
            sensitivity: self.sensitivity(),
            mode: self.motion_mode(),
        }
    }

    /// Master switch
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Trigger condition
    pub fn trigger_active(&self) -> bool {
        self.trigger_active.load(Ordering::Relaxed)
    }

    /// Current sensitivity
    pub fn sensitivity(&self) -> f64 {
        f64::from_bits(self.sensitivity_bits.load(Ordering::Relaxed))
    }

    /// Current synthesis mode
    pub fn motion_mode(&self) -> MotionMode {
        MotionMode::from_u8(self.mode.load(Ordering::Relaxed))
    }

    /// Preset table
    pub fn presets(&self) -> &[f64] {
        &self.presets
    }

    /// Fine-adjustment step
    pub fn fine_step(&self) -> f64 {
        self.fine_step
    }

    /// Store a clamped sensitivity and refresh the display
    ///
    /// NaN is ignored. Returns the stored value.
    pub fn set_sensitivity(&self, value: f64) -> f64 {
        let Some(clamped) = clamp_sensitivity(value) else {
            warn!("Ignoring non-numeric sensitivity");
            return self.sensitivity();
        };
        self.sensitivity_bits
            .store(clamped.to_bits(), Ordering::Relaxed);
        debug!("Sensitivity set to {:.7}", clamped);
        self.refresh();
        clamped
    }

    /// Step the sensitivity by `delta`, clamped to the valid range
    pub fn adjust_sensitivity(&self, delta: f64) -> f64 {
        let target = self.sensitivity() + delta;
        self.set_sensitivity((target * ADJUST_GRID).round() / ADJUST_GRID)
    }

    /// One fine step up
    pub fn increase_sensitivity(&self) -> f64 {
        self.adjust_sensitivity(self.fine_step)
    }

    /// One fine step down
    pub fn decrease_sensitivity(&self) -> f64 {
        self.adjust_sensitivity(-self.fine_step)
    }

    /// Load a preset by index
    ///
    /// Returns `None` when the index is outside the table.
    pub fn apply_preset(&self, index: usize) -> Option<f64> {
        match self.presets.get(index) {
            Some(&value) => Some(self.set_sensitivity(value)),
            None => {
                debug!(
                    "Preset {} not defined ({} presets)",
                    index,
                    self.presets.len()
                );
                None
            }
        }
    }

    /// Flip the master switch
    pub fn toggle_enabled(&self) -> bool {
        let enabled = !self.enabled.fetch_xor(true, Ordering::Relaxed);
        debug!("Motion {}", if enabled { "enabled" } else { "disabled" });
        self.refresh();
        enabled
    }

    /// Set the master switch
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
        self.refresh();
    }

    /// Advance to the next synthesis mode
    pub fn toggle_motion_mode(&self) -> MotionMode {
        let next = self.motion_mode().next();
        self.set_motion_mode(next);
        next
    }

    /// Select a synthesis mode
    pub fn set_motion_mode(&self, mode: MotionMode) {
        self.mode.store(mode.to_u8(), Ordering::Relaxed);
        debug!("Motion mode set to {}", mode);
        self.refresh();
    }

    /// Record the externally sampled trigger condition
    pub fn set_trigger_active(&self, active: bool) {
        let was = self.trigger_active.swap(active, Ordering::Relaxed);
        if was != active {
            trace!("Trigger {}", if active { "pressed" } else { "released" });
        }
    }

    /// Whether the loops should keep running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Ask both loops to exit after their current tick
    pub fn request_shutdown(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            debug!("Shutdown requested");
        }
    }

    /// Current presentable state
    pub fn status(&self) -> StatusReport {
        StatusReport {
            enabled: self.enabled(),
            sensitivity: self.sensitivity(),
            mode: self.motion_mode(),
        }
    }

    /// Push the current status to the display, if any
    pub fn refresh(&self) {
        if let Some(display) = &self.display {
            if let Err(e) = display.show(&self.status()) {
                debug!("Status display refresh dropped: {}", e);
            }
        }
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVITY, MotionMode::Direct)
    }
}

impl std::fmt::Debug for ControlState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlState")
            .field("snapshot", &self.snapshot())
            .field("running", &self.is_running())
            .field("presets", &self.presets)
            .field("fine_step", &self.fine_step)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::RecordingDisplay;
    use proptest::prelude::*;

    #[test]
    fn test_initial_state() {
        let state = ControlState::default();
        let snap = state.snapshot();
        assert!(!snap.enabled);
        assert!(!snap.trigger_active);
        assert_eq!(snap.sensitivity, DEFAULT_SENSITIVITY);
        assert_eq!(snap.mode, MotionMode::Direct);
        assert!(state.is_running());
    }

    #[test]
    fn test_engaged_requires_both_flags() {
        let state = ControlState::default();
        state.set_trigger_active(true);
        assert!(!state.snapshot().is_engaged());
        state.toggle_enabled();
        assert!(state.snapshot().is_engaged());
        state.set_trigger_active(false);
        assert!(!state.snapshot().is_engaged());
    }

    #[test]
    fn test_fine_adjust_reaches_upper_bound_exactly() {
        let state = ControlState::default();
        state.set_sensitivity(19.99995);
        assert_eq!(state.adjust_sensitivity(0.00005), 20.0);
        assert_eq!(state.increase_sensitivity(), 20.0);
        assert_eq!(state.increase_sensitivity(), 20.0);
        assert_eq!(state.sensitivity(), 20.0);
    }

    #[test]
    fn test_fine_adjust_reaches_lower_bound_exactly() {
        let state = ControlState::new(0.00005, MotionMode::Direct);
        assert_eq!(state.decrease_sensitivity(), 0.0);
        assert_eq!(state.decrease_sensitivity(), 0.0);
    }

    #[test]
    fn test_nan_is_ignored() {
        let state = ControlState::default();
        state.set_sensitivity(3.0);
        assert_eq!(state.set_sensitivity(f64::NAN), 3.0);
        assert_eq!(state.sensitivity(), 3.0);
    }

    #[test]
    fn test_presets() {
        let state = ControlState::default().with_presets(vec![0.8571, 12.89035]);
        assert_eq!(state.apply_preset(1), Some(12.89035));
        assert_eq!(state.sensitivity(), 12.89035);
        assert_eq!(state.apply_preset(2), None);
        assert_eq!(state.sensitivity(), 12.89035);
    }

    #[test]
    fn test_toggle_does_not_touch_sensitivity() {
        let state = ControlState::default();
        state.set_sensitivity(4.0);
        state.toggle_enabled();
        state.toggle_motion_mode();
        assert_eq!(state.sensitivity(), 4.0);
        assert_eq!(state.motion_mode(), MotionMode::Curved);
    }

    #[test]
    fn test_every_change_refreshes_display() {
        let display = Arc::new(RecordingDisplay::default());
        let state = ControlState::default().with_display(display.clone());

        state.set_sensitivity(2.0);
        state.toggle_enabled();
        state.toggle_motion_mode();
        state.set_trigger_active(true);

        let reports = display.reports();
        assert_eq!(reports.len(), 3);
        let last = reports.last().unwrap();
        assert!(last.enabled);
        assert_eq!(last.sensitivity, 2.0);
        assert_eq!(last.mode, MotionMode::Curved);
    }

    #[test]
    fn test_shutdown_flag() {
        let state = ControlState::default();
        state.request_shutdown();
        state.request_shutdown();
        assert!(!state.is_running());
    }

    proptest! {
        #[test]
        fn prop_clamp_is_idempotent(value in -1.0e6f64..1.0e6) {
            let state = ControlState::default();
            let first = state.set_sensitivity(value);
            prop_assert!((0.0..=20.0).contains(&first));
            if value < 0.0 {
                prop_assert_eq!(first, 0.0);
            }
            if value > 20.0 {
                prop_assert_eq!(first, 20.0);
            }
            let second = state.set_sensitivity(first);
            prop_assert_eq!(first, second);
        }
    }
}
