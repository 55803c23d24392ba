//! Control commands

use std::fmt;
use std::str::FromStr;

use super::error::{CommandParseError, InputError, Result};
use crate::control::{ControlState, MotionMode};

/// One control action from the input collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputCommand {
    /// Flip the master enable flag
    Toggle,
    /// Advance to the next synthesis mode
    CycleMode,
    /// Select a synthesis mode
    SetMode(MotionMode),
    /// Apply a preset (zero-based index)
    Preset(usize),
    /// One fine step up
    Increase,
    /// One fine step down
    Decrease,
    /// Set sensitivity directly
    SetSensitivity(f64),
    /// Trigger pressed
    Hold,
    /// Trigger released
    Release,
    /// Re-emit the status line
    Status,
    /// Stop both loops
    Quit,
}

impl InputCommand {
    /// Apply to the shared control state
    pub fn apply(self, controls: &ControlState) -> Result<()> {
        match self {
            Self::Toggle => {
                controls.toggle_enabled();
            }
            Self::CycleMode => {
                controls.toggle_motion_mode();
            }
            Self::SetMode(mode) => controls.set_motion_mode(mode),
            Self::Preset(index) => {
                if controls.apply_preset(index).is_none() {
                    return Err(InputError::UnknownPreset {
                        index,
                        available: controls.presets().len(),
                    });
                }
            }
            Self::Increase => {
                controls.increase_sensitivity();
            }
            Self::Decrease => {
                controls.decrease_sensitivity();
            }
            Self::SetSensitivity(value) => {
                if value.is_nan() {
                    return Err(InputError::InvalidSensitivity(value));
                }
                controls.set_sensitivity(value);
            }
            Self::Hold => controls.set_trigger_active(true),
            Self::Release => controls.set_trigger_active(false),
            Self::Status => controls.refresh(),
            Self::Quit => controls.request_shutdown(),
        }
        Ok(())
    }

    /// One-line usage summary
    pub fn help() -> &'static str {
        "toggle | mode [direct|curved|smooth] | preset N | + | - | set X | hold | release | status | quit"
    }
}

impl fmt::Display for InputCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toggle => write!(f, "toggle"),
            Self::CycleMode => write!(f, "mode"),
            Self::SetMode(mode) => write!(f, "mode {}", mode),
            Self::Preset(index) => write!(f, "preset {}", index + 1),
            Self::Increase => write!(f, "+"),
            Self::Decrease => write!(f, "-"),
            Self::SetSensitivity(value) => write!(f, "set {}", value),
            Self::Hold => write!(f, "hold"),
            Self::Release => write!(f, "release"),
            Self::Status => write!(f, "status"),
            Self::Quit => write!(f, "quit"),
        }
    }
}

impl FromStr for InputCommand {
    type Err = CommandParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let mut words = lowered.split_whitespace();
        let head = words.next().ok_or(CommandParseError::Empty)?;
        let arg = words.next();
        if words.next().is_some() {
            return Err(CommandParseError::TrailingInput(command_name(head)));
        }

        let no_arg = |command: Self, name: &'static str| match arg {
            None => Ok(command),
            Some(_) => Err(CommandParseError::TrailingInput(name)),
        };

        match head {
            "toggle" | "t" => no_arg(Self::Toggle, "toggle"),
            "mode" | "m" => match arg {
                None => Ok(Self::CycleMode),
                Some(name) => name.parse::<MotionMode>().map(Self::SetMode).map_err(|_| {
                    CommandParseError::InvalidArgument {
                        command: "mode",
                        value: name.to_string(),
                    }
                }),
            },
            "preset" | "p" => {
                let value = arg.ok_or(CommandParseError::MissingArgument("preset"))?;
                parse_preset(value)
            }
            "+" | "up" => no_arg(Self::Increase, "+"),
            "-" | "down" => no_arg(Self::Decrease, "-"),
            "set" | "s" => {
                let value = arg.ok_or(CommandParseError::MissingArgument("set"))?;
                value
                    .parse::<f64>()
                    .ok()
                    .filter(|v| !v.is_nan())
                    .map(Self::SetSensitivity)
                    .ok_or_else(|| CommandParseError::InvalidArgument {
                        command: "set",
                        value: value.to_string(),
                    })
            }
            "hold" | "press" => no_arg(Self::Hold, "hold"),
            "release" => no_arg(Self::Release, "release"),
            "status" | "?" => no_arg(Self::Status, "status"),
            "quit" | "exit" | "q" => no_arg(Self::Quit, "quit"),
            // Bare digits select a preset, like the number keys
            digits if digits.chars().all(|c| c.is_ascii_digit()) => {
                no_arg(parse_preset(digits)?, "preset")
            }
            other => Err(CommandParseError::Unknown(other.to_string())),
        }
    }
}

fn parse_preset(value: &str) -> std::result::Result<InputCommand, CommandParseError> {
    match value.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(InputCommand::Preset(n - 1)),
        _ => Err(CommandParseError::InvalidArgument {
            command: "preset",
            value: value.to_string(),
        }),
    }
}

fn command_name(head: &str) -> &'static str {
    match head {
        "toggle" | "t" => "toggle",
        "mode" | "m" => "mode",
        "preset" | "p" => "preset",
        "set" | "s" => "set",
        _ => "command",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("toggle".parse::<InputCommand>(), Ok(InputCommand::Toggle));
        assert_eq!("  T ".parse::<InputCommand>(), Ok(InputCommand::Toggle));
        assert_eq!("+".parse::<InputCommand>(), Ok(InputCommand::Increase));
        assert_eq!("-".parse::<InputCommand>(), Ok(InputCommand::Decrease));
        assert_eq!("hold".parse::<InputCommand>(), Ok(InputCommand::Hold));
        assert_eq!("release".parse::<InputCommand>(), Ok(InputCommand::Release));
        assert_eq!("QUIT".parse::<InputCommand>(), Ok(InputCommand::Quit));
        assert_eq!("mode".parse::<InputCommand>(), Ok(InputCommand::CycleMode));
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(
            "mode curved".parse::<InputCommand>(),
            Ok(InputCommand::SetMode(MotionMode::Curved))
        );
        assert_eq!("preset 1".parse::<InputCommand>(), Ok(InputCommand::Preset(0)));
        assert_eq!("6".parse::<InputCommand>(), Ok(InputCommand::Preset(5)));
        assert_eq!(
            "set 2.5".parse::<InputCommand>(),
            Ok(InputCommand::SetSensitivity(2.5))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<InputCommand>(), Err(CommandParseError::Empty));
        assert_eq!(
            "jump".parse::<InputCommand>(),
            Err(CommandParseError::Unknown("jump".to_string()))
        );
        assert_eq!(
            "set".parse::<InputCommand>(),
            Err(CommandParseError::MissingArgument("set"))
        );
        assert!(matches!(
            "set fast".parse::<InputCommand>(),
            Err(CommandParseError::InvalidArgument { command: "set", .. })
        ));
        assert!(matches!(
            "set NaN".parse::<InputCommand>(),
            Err(CommandParseError::InvalidArgument { .. })
        ));
        assert!(matches!(
            "preset 0".parse::<InputCommand>(),
            Err(CommandParseError::InvalidArgument { command: "preset", .. })
        ));
        assert_eq!(
            "toggle now".parse::<InputCommand>(),
            Err(CommandParseError::TrailingInput("toggle"))
        );
    }

    #[test]
    fn test_display_parses_back() {
        for command in [
            InputCommand::Toggle,
            InputCommand::SetMode(MotionMode::SmoothedAccelerating),
            InputCommand::Preset(3),
            InputCommand::SetSensitivity(1.25),
            InputCommand::Quit,
        ] {
            assert_eq!(command.to_string().parse::<InputCommand>(), Ok(command));
        }
    }

    #[test]
    fn test_apply_commands() {
        let controls = ControlState::new(1.0, MotionMode::Direct)
            .with_presets(vec![0.8571, 1.408]);

        InputCommand::Toggle.apply(&controls).unwrap();
        assert!(controls.enabled());

        InputCommand::Hold.apply(&controls).unwrap();
        assert!(controls.snapshot().is_engaged());
        InputCommand::Release.apply(&controls).unwrap();
        assert!(!controls.trigger_active());

        InputCommand::Preset(1).apply(&controls).unwrap();
        assert_eq!(controls.sensitivity(), 1.408);

        InputCommand::SetSensitivity(30.0).apply(&controls).unwrap();
        assert_eq!(controls.sensitivity(), 20.0);

        InputCommand::CycleMode.apply(&controls).unwrap();
        assert_eq!(controls.motion_mode(), MotionMode::Curved);

        InputCommand::Quit.apply(&controls).unwrap();
        assert!(!controls.is_running());
    }

    #[test]
    fn test_apply_unknown_preset() {
        let controls = ControlState::new(1.0, MotionMode::Direct).with_presets(vec![1.5]);
        let err = InputCommand::Preset(4).apply(&controls).unwrap_err();
        assert!(matches!(
            err,
            InputError::UnknownPreset {
                index: 4,
                available: 1
            }
        ));
        assert_eq!(controls.sensitivity(), 1.0);
    }

    #[test]
    fn test_apply_nan_sensitivity_is_rejected() {
        let controls = ControlState::new(2.5, MotionMode::Direct);
        let err = InputCommand::SetSensitivity(f64::NAN)
            .apply(&controls)
            .unwrap_err();
        assert!(matches!(err, InputError::InvalidSensitivity(v) if v.is_nan()));
        assert_eq!(controls.sensitivity(), 2.5);
    }
}
