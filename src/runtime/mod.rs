//! Thread lifecycle for the motion and input loops
//!
//! [`MotionRuntime`] owns the two long-lived threads: the motion scheduler
//! and the input sampler. Both poll the shared `running` flag once per
//! iteration, so stopping is cooperative and takes at most one period per
//! loop.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::control::ControlState;
use crate::input::{command_channel, CommandSender, InputSampler};
use crate::output::{DisplacementSink, StatusDisplay};
use crate::scheduler::{MotionScheduler, TickStats};

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Runtime lifecycle errors
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Thread could not be created
    #[error("Failed to spawn {name} thread: {source}")]
    Spawn {
        /// Thread name
        name: &'static str,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Thread panicked before it could be joined
    #[error("{0} thread panicked")]
    Join(&'static str),
}

const SCHEDULER_THREAD: &str = "motion-scheduler";
const SAMPLER_THREAD: &str = "input-sampler";

/// Running motion subsystem
pub struct MotionRuntime {
    controls: Arc<ControlState>,
    commands: CommandSender,
    scheduler: Option<JoinHandle<TickStats>>,
    sampler: Option<JoinHandle<u64>>,
}

impl MotionRuntime {
    /// Build the control state from `config` and start both loops
    pub fn start(
        config: &Config,
        sink: Box<dyn DisplacementSink>,
        display: Option<Arc<dyn StatusDisplay>>,
    ) -> Result<Self> {
        let mut controls = ControlState::new(
            config.motion.initial_sensitivity,
            config.motion.initial_mode,
        )
        .with_presets(config.input.presets.clone())
        .with_fine_step(config.input.fine_step)
        .with_enabled(config.motion.start_enabled);
        if let Some(display) = display {
            controls = controls.with_display(display);
        }

        Self::start_with_controls(config, Arc::new(controls), sink)
    }

    /// Start both loops around an existing control state
    pub fn start_with_controls(
        config: &Config,
        controls: Arc<ControlState>,
        sink: Box<dyn DisplacementSink>,
    ) -> Result<Self> {
        let (commands, receiver) = command_channel();

        let scheduler = MotionScheduler::new(config, Arc::clone(&controls), sink);
        let scheduler = thread::Builder::new()
            .name(SCHEDULER_THREAD.to_string())
            .spawn(move || scheduler.run())
            .map_err(|source| RuntimeError::Spawn {
                name: SCHEDULER_THREAD,
                source,
            })?;

        let sampler = InputSampler::new(
            Arc::clone(&controls),
            receiver,
            std::time::Duration::from_millis(config.input.poll_interval_ms),
        );
        let sampler = match thread::Builder::new()
            .name(SAMPLER_THREAD.to_string())
            .spawn(move || sampler.run())
        {
            Ok(handle) => handle,
            Err(source) => {
                controls.request_shutdown();
                if scheduler.join().is_err() {
                    error!("Motion scheduler panicked during aborted start");
                }
                return Err(RuntimeError::Spawn {
                    name: SAMPLER_THREAD,
                    source,
                });
            }
        };

        info!("Motion runtime started");
        controls.refresh();

        Ok(Self {
            controls,
            commands,
            scheduler: Some(scheduler),
            sampler: Some(sampler),
        })
    }

    /// Shared control state
    pub fn controls(&self) -> Arc<ControlState> {
        Arc::clone(&self.controls)
    }

    /// New handle for queuing commands to the input sampler
    pub fn command_sender(&self) -> CommandSender {
        self.commands.clone()
    }

    /// Whether both loops are still meant to run
    pub fn is_running(&self) -> bool {
        self.controls.is_running()
    }

    /// Block until both loops exit on their own
    ///
    /// Something else must clear the `running` flag, such as a `quit`
    /// command or another holder of [`controls`](Self::controls).
    pub fn wait(mut self) -> Result<TickStats> {
        self.join_all()
    }

    /// Stop both loops and wait for them
    pub fn shutdown(mut self) -> Result<TickStats> {
        info!("Shutting down motion runtime");
        self.controls.request_shutdown();
        self.join_all()
    }

    fn join_all(&mut self) -> Result<TickStats> {
        let mut outcome = Ok(TickStats::default());

        if let Some(handle) = self.scheduler.take() {
            outcome = handle
                .join()
                .map_err(|_| RuntimeError::Join(SCHEDULER_THREAD));
        }
        if let Some(handle) = self.sampler.take() {
            match handle.join() {
                Ok(applied) => debug!("Input sampler joined after {} commands", applied),
                Err(_) => {
                    if outcome.is_ok() {
                        outcome = Err(RuntimeError::Join(SAMPLER_THREAD));
                    }
                }
            }
        }

        if outcome.is_ok() {
            info!("Motion runtime stopped");
        }
        outcome
    }
}

impl Drop for MotionRuntime {
    fn drop(&mut self) {
        if self.scheduler.is_none() && self.sampler.is_none() {
            return;
        }
        debug!("Dropping MotionRuntime");
        self.controls.request_shutdown();
        if let Err(e) = self.join_all() {
            error!("{}", e);
        }
    }
}

impl std::fmt::Debug for MotionRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionRuntime")
            .field("controls", &self.controls)
            .field("scheduler_alive", &self.scheduler.is_some())
            .field("sampler_alive", &self.sampler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputCommand;
    use crate::motion::Point2D;
    use crate::output::{RecordingDisplay, VirtualCursorSink};
    use std::time::Duration;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.realtime.elevate_priority = false;
        config.input.poll_interval_ms = 1;
        config.scheduler.tick_period_us = 1_000;
        config
    }

    #[test]
    fn test_start_and_shutdown() {
        let sink = VirtualCursorSink::new(Point2D::default(), 0);
        let runtime = MotionRuntime::start(&test_config(), Box::new(sink), None).unwrap();
        assert!(runtime.is_running());

        std::thread::sleep(Duration::from_millis(20));
        let stats = runtime.shutdown().unwrap();
        assert!(stats.ticks > 0);
        assert_eq!(stats.pixels_emitted, 0);
    }

    #[test]
    fn test_quit_command_ends_wait() {
        let sink = VirtualCursorSink::new(Point2D::default(), 0);
        let runtime = MotionRuntime::start(&test_config(), Box::new(sink), None).unwrap();
        let controls = runtime.controls();

        runtime.command_sender().send(InputCommand::Quit).unwrap();
        runtime.wait().unwrap();
        assert!(!controls.is_running());
    }

    #[test]
    fn test_initial_status_is_displayed() {
        let display = Arc::new(RecordingDisplay::default());
        let mut config = test_config();
        config.motion.start_enabled = true;
        let sink = VirtualCursorSink::new(Point2D::default(), 0);

        let runtime = MotionRuntime::start(
            &config,
            Box::new(sink),
            Some(Arc::clone(&display) as Arc<dyn StatusDisplay>),
        )
        .unwrap();
        drop(runtime);

        let reports = display.reports();
        assert!(!reports.is_empty());
        assert!(reports[0].enabled);
    }
}
