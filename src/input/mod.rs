//! Control input
//!
//! Commands arrive from an outside producer (the console reader in the
//! binary, or anything holding a [`CommandSender`]) and are applied to the
//! shared [`ControlState`](crate::control::ControlState) by a dedicated
//! sampling loop at a coarse cadence. The motion loop never waits on this
//! path.
//!
//! ```text
//! producer ──send──▶ channel ──poll every 10ms──▶ InputSampler ──▶ ControlState
//! ```

mod command;
mod error;
mod sampler;

pub use command::InputCommand;
pub use error::{CommandParseError, InputError, Result};
pub use sampler::{command_channel, CommandSender, InputSampler};
