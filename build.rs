//! Embeds the commit and build time reported by `themer --version`.

use std::env;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rerun-if-env-changed=THEMER_BUILD_GIT_HASH");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let commit = env::var("THEMER_BUILD_GIT_HASH")
        .ok()
        .or_else(describe_head)
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=THEMER_BUILD_GIT_HASH={commit}");
    println!("cargo:rustc-env=THEMER_BUILD_TIMESTAMP={}", build_time());
}

fn describe_head() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=12"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// `SOURCE_DATE_EPOCH` takes precedence over the wall clock.
fn build_time() -> String {
    let secs = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|delta| delta.as_secs())
                .unwrap_or(0)
        });
    format!("unix:{secs}")
}
