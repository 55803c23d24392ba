//! User-Friendly Error Formatting
//!
//! Provides user-friendly error messages with troubleshooting hints
//! for common error scenarios.

use std::fmt::Write;

/// Format error for user consumption
///
/// Takes technical error and produces user-friendly message with
/// troubleshooting steps and context.
pub fn format_user_error(error: &anyhow::Error) -> String {
    let mut output = String::new();

    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "╔════════════════════════════════════════════════════════════╗"
    )
    .ok();
    writeln!(
        &mut output,
        "║                     ERROR                                  ║"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();
    writeln!(&mut output).ok();

    // Match on the whole chain so context wrappers don't hide the cause
    let error_msg = format!("{:#}", error);
    let lowered = error_msg.to_lowercase();

    if lowered.contains("config") || lowered.contains("toml") {
        format_config_error(&mut output);
    } else if lowered.contains("thread") || lowered.contains("spawn") {
        format_thread_error(&mut output);
    } else if lowered.contains("priority") || lowered.contains("affinity") {
        format_realtime_error(&mut output);
    } else {
        format_generic_error(&mut output, &error_msg);
    }

    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Technical Details:").ok();
    writeln!(&mut output).ok();
    writeln!(&mut output, "{:#}", error).ok();
    writeln!(&mut output).ok();

    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Need Help?").ok();
    writeln!(
        &mut output,
        "  - Run with --verbose for detailed logs: lamco-motion -vv"
    )
    .ok();
    writeln!(
        &mut output,
        "  - Check scheduling rights: lamco-motion --diagnose"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();

    output
}

fn format_config_error(output: &mut String) {
    writeln!(output, "Configuration Error").ok();
    writeln!(output).ok();
    writeln!(output, "Problem with configuration file.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Invalid TOML syntax").ok();
    writeln!(output, "     → Check for typos, missing quotes, etc.").ok();
    writeln!(output).ok();
    writeln!(output, "  2. Value out of range").ok();
    writeln!(output, "     → Sensitivity and presets must be within 0..=20").ok();
    writeln!(output, "     → rt_priority must be within 1..=99").ok();
    writeln!(output).ok();
    writeln!(output, "  3. Start from a known-good file").ok();
    writeln!(
        output,
        "     → lamco-motion --dump-config > ~/.config/lamco-motion/config.toml"
    )
    .ok();
}

fn format_thread_error(output: &mut String) {
    writeln!(output, "Thread Error").ok();
    writeln!(output).ok();
    writeln!(output, "A motion or input thread could not be started or failed.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Process or thread limit reached").ok();
    writeln!(output, "     → Check: ulimit -u").ok();
    writeln!(output).ok();
    writeln!(output, "  2. A loop panicked").ok();
    writeln!(output, "     → Re-run with RUST_BACKTRACE=1 and -vv").ok();
}

fn format_realtime_error(output: &mut String) {
    writeln!(output, "Scheduling Error").ok();
    writeln!(output).ok();
    writeln!(output, "The motion thread could not get the requested scheduling.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. No real-time rights").ok();
    writeln!(
        output,
        "     → Raise RLIMIT_RTPRIO in /etc/security/limits.conf (rtprio)"
    )
    .ok();
    writeln!(output, "     → Or grant CAP_SYS_NICE to the binary").ok();
    writeln!(output).ok();
    writeln!(output, "  2. CPU index out of range").ok();
    writeln!(output, "     → Check [realtime] pin_cpu against nproc").ok();
}

fn format_generic_error(output: &mut String, error: &str) {
    writeln!(output, "Motion Error").ok();
    writeln!(output).ok();
    writeln!(output, "Error: {}", error).ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_user_error() {
        let error = anyhow::anyhow!("Failed to parse config file");
        let formatted = format_user_error(&error);
        assert!(formatted.contains("ERROR"));
        assert!(formatted.contains("Configuration Error"));
    }

    #[test]
    fn test_context_chain_is_matched() {
        let error = anyhow::anyhow!("Failed to spawn motion-scheduler thread")
            .context("Failed to start motion runtime");
        let formatted = format_user_error(&error);
        assert!(formatted.contains("Thread Error"));
        assert!(formatted.contains("ulimit"));
    }

    #[test]
    fn test_generic_error() {
        let error = anyhow::anyhow!("something odd");
        let formatted = format_user_error(&error);
        assert!(formatted.contains("Motion Error"));
        assert!(formatted.contains("something odd"));
    }
}
