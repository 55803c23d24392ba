//! Input sampling loop

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tracing::{debug, info, warn};

use super::command::InputCommand;
use crate::control::ControlState;

/// Sending half handed to whatever produces commands
pub type CommandSender = Sender<InputCommand>;

/// Unbounded command channel
pub fn command_channel() -> (CommandSender, Receiver<InputCommand>) {
    crossbeam_channel::unbounded()
}

/// Applies queued commands to the control state at a fixed poll cadence
pub struct InputSampler {
    controls: Arc<ControlState>,
    commands: Receiver<InputCommand>,
    poll_interval: Duration,
    applied: u64,
    rejected: u64,
    disconnected: bool,
}

impl InputSampler {
    /// Create a sampler reading from `commands`
    pub fn new(
        controls: Arc<ControlState>,
        commands: Receiver<InputCommand>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            controls,
            commands,
            poll_interval,
            applied: 0,
            rejected: 0,
            disconnected: false,
        }
    }

    /// Commands applied so far
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Commands that failed to apply
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Drain everything queued right now
    ///
    /// Returns the number of commands taken off the channel.
    pub fn poll(&mut self) -> usize {
        let mut taken = 0;
        loop {
            match self.commands.try_recv() {
                Ok(command) => {
                    taken += 1;
                    match command.apply(&self.controls) {
                        Ok(()) => self.applied += 1,
                        Err(e) => {
                            warn!("Command '{}' not applied: {}", command, e);
                            self.rejected += 1;
                        }
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.disconnected {
                        debug!("All command senders dropped");
                        self.disconnected = true;
                    }
                    break;
                }
            }
        }
        taken
    }

    /// Poll until the shared `running` flag clears
    pub fn run(mut self) -> u64 {
        info!("Input sampler starting, poll every {:?}", self.poll_interval);
        while self.controls.is_running() {
            self.poll();
            if !self.controls.is_running() {
                break;
            }
            std::thread::sleep(self.poll_interval);
        }
        info!(
            "Input sampler stopped ({} applied, {} rejected)",
            self.applied, self.rejected
        );
        self.applied
    }
}
