//! Build script for lamco-motion
//!
//! Stamps the binary with the source revision and the target it was built
//! for. No wall-clock time is embedded, so rebuilding the same tree for the
//! same target gives the same banner.

use std::env;
use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn main() {
    let describe = git(&["describe", "--tags", "--always", "--dirty"])
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=LAMCO_MOTION_GIT_DESCRIBE={describe}");

    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=LAMCO_MOTION_TARGET={target}");

    // Branch switches touch HEAD, new commits and tags touch refs
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs");
    println!("cargo:rerun-if-changed=build.rs");
}
