//! Build script: embeds the version string shown by `--version`.
//!
//! `CHATMORSE_VERSION` is the package version, with the git short hash
//! appended (`0.1.0+abc1234`) when building from a checkout.

use std::process::Command;

fn main() {
    let version = env!("CARGO_PKG_VERSION");
    let full_version = match git_short_hash() {
        Some(hash) => format!("{}+{}", version, hash),
        None => version.to_string(),
    };
    println!("cargo:rustc-env=CHATMORSE_VERSION={}", full_version);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");
}

fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!hash.is_empty()).then_some(hash)
}
