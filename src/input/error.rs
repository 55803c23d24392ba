//! Input Handling Error Types

use thiserror::Error;

/// Result type for input operations
pub type Result<T> = std::result::Result<T, InputError>;

/// Console command parse failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandParseError {
    /// Blank line
    #[error("Empty command")]
    Empty,

    /// First word not recognised
    #[error("Unknown command: {0}")]
    Unknown(String),

    /// Command needs an argument
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    /// Argument present but unusable
    #[error("Invalid argument for '{command}': {value}")]
    InvalidArgument {
        /// Command name
        command: &'static str,
        /// Argument as typed
        value: String,
    },

    /// Extra words after a complete command
    #[error("Unexpected input after '{0}'")]
    TrailingInput(&'static str),
}

/// Input module error types
#[derive(Error, Debug)]
pub enum InputError {
    /// Command could not be parsed
    #[error(transparent)]
    Parse(#[from] CommandParseError),

    /// Preset index past the end of the table
    #[error("No preset {index} (have {available})")]
    UnknownPreset {
        /// Zero-based index requested
        index: usize,
        /// Table length
        available: usize,
    },

    /// Sensitivity value rejected
    #[error("Invalid sensitivity: {0}")]
    InvalidSensitivity(f64),
}
