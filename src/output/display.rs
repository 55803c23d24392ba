//! Status display adapters

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::Result;
use crate::control::StatusReport;

/// Presentation of control-state changes
pub trait StatusDisplay: Send + Sync {
    /// Present a status report
    fn show(&self, status: &StatusReport) -> Result<()>;
}

/// Status output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusFormat {
    /// Coloured console line
    #[default]
    Text,
    /// One JSON object per line
    Json,
    /// Through the tracing subscriber only
    Log,
}

impl StatusFormat {
    /// Build the matching display adapter
    pub fn into_display(self) -> Arc<dyn StatusDisplay> {
        match self {
            Self::Text => Arc::new(ConsoleDisplay::new(true)),
            Self::Json => Arc::new(JsonDisplay),
            Self::Log => Arc::new(TracingDisplay),
        }
    }
}

impl std::str::FromStr for StatusFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "console" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "log" | "tracing" => Ok(Self::Log),
            _ => Err(format!("Unknown status format: {}", s)),
        }
    }
}

/// Logs each report at info level
#[derive(Debug, Default)]
pub struct TracingDisplay;

impl StatusDisplay for TracingDisplay {
    fn show(&self, status: &StatusReport) -> Result<()> {
        info!(
            enabled = status.enabled,
            sensitivity = status.sensitivity,
            mode = %status.mode,
            "{}",
            status
        );
        Ok(())
    }
}

/// Writes one line per report to stdout
#[derive(Debug)]
pub struct ConsoleDisplay {
    ansi: bool,
}

impl ConsoleDisplay {
    /// Create a console display, optionally with ANSI colours
    pub fn new(ansi: bool) -> Self {
        Self { ansi }
    }

    fn render(&self, status: &StatusReport) -> String {
        if !self.ansi {
            return status.to_string();
        }
        let colour = if status.enabled { "\x1b[92m" } else { "\x1b[91m" };
        format!("{}{}\x1b[0m", colour, status)
    }
}

impl StatusDisplay for ConsoleDisplay {
    fn show(&self, status: &StatusReport) -> Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", self.render(status))?;
        out.flush()?;
        Ok(())
    }
}

/// Writes one JSON object per report to stdout
#[derive(Debug, Default)]
pub struct JsonDisplay;

impl StatusDisplay for JsonDisplay {
    fn show(&self, status: &StatusReport) -> Result<()> {
        let line = serde_json::to_string(status)?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", line)?;
        Ok(())
    }
}

/// Keeps every report in memory
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    reports: Mutex<Vec<StatusReport>>,
}

impl RecordingDisplay {
    /// Reports received so far
    pub fn reports(&self) -> Vec<StatusReport> {
        self.reports.lock().clone()
    }
}

impl StatusDisplay for RecordingDisplay {
    fn show(&self, status: &StatusReport) -> Result<()> {
        self.reports.lock().push(*status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::MotionMode;

    fn report(enabled: bool) -> StatusReport {
        StatusReport {
            enabled,
            sensitivity: 8.605,
            mode: MotionMode::Direct,
        }
    }

    #[test]
    fn test_console_colours() {
        let display = ConsoleDisplay::new(true);
        assert!(display.render(&report(true)).starts_with("\x1b[92m"));
        assert!(display.render(&report(false)).starts_with("\x1b[91m"));

        let plain = ConsoleDisplay::new(false);
        assert_eq!(
            plain.render(&report(true)),
            "ENABLED | Sensitivity: 8.6050000 | Mode: Direct"
        );
    }

    #[test]
    fn test_status_format_from_str() {
        assert_eq!("json".parse::<StatusFormat>().unwrap(), StatusFormat::Json);
        assert_eq!("console".parse::<StatusFormat>().unwrap(), StatusFormat::Text);
        assert_eq!("tracing".parse::<StatusFormat>().unwrap(), StatusFormat::Log);
        assert!("xml".parse::<StatusFormat>().is_err());
    }

    #[test]
    fn test_recording_display() {
        let display = RecordingDisplay::default();
        display.show(&report(true)).unwrap();
        display.show(&report(false)).unwrap();
        assert_eq!(display.reports().len(), 2);
    }
}
