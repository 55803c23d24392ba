//! Utility Functions and Diagnostics
//!
//! System diagnostics and user-friendly error formatting.
//!
//! ## Diagnostics
//!
//! The [`diagnostics`] module describes the host and what the process may do
//! about its own scheduling:
//!
//! ```rust,no_run
//! use lamco_motion::utils::{DiagnosticsReport, SystemInfo};
//!
//! SystemInfo::gather().log();
//! println!("{}", DiagnosticsReport::gather());
//! ```
//!
//! **CLI access:**
//! ```bash
//! lamco-motion --diagnose
//! ```
//!
//! ## Error Formatting
//!
//! The [`errors`] module turns a fatal error into a message with
//! troubleshooting hints:
//!
//! ```rust,no_run
//! use lamco_motion::utils::format_user_error;
//!
//! let err = anyhow::anyhow!("Failed to parse config file");
//! eprintln!("{}", format_user_error(&err));
//! ```
//!
//! Error categories with context-aware help:
//! - Config errors → TOML syntax, value ranges, `--dump-config`
//! - Thread errors → process limits, panics
//! - Scheduling errors → `RLIMIT_RTPRIO`, `CAP_SYS_NICE`, CPU index

pub mod diagnostics;
pub mod errors;

// Re-export key types
pub use diagnostics::{
    log_startup_diagnostics, BuildInfo, DiagnosticsReport, RealtimeCapability, SystemInfo,
};
pub use errors::format_user_error;
