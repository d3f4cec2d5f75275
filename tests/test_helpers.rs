#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;

pub const TEST_PASSPHRASE: &str = "test-passphrase";

/// Creates a `Command` for the `aesvault` binary with a clean, non-interactive
/// environment rooted at `data_dir`.
pub fn base_aesvault_command(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("aesvault").expect("aesvault binary not built");
    configure_aesvault_command(&mut cmd, data_dir);
    cmd
}

/// Applies the standard non-interactive environment to an existing `Command`.
pub fn configure_aesvault_command(cmd: &mut Command, data_dir: &Path) {
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
        cmd.env("PATH", path);
    }
    if let Ok(tmpdir) = std::env::var("TMPDIR") {
        cmd.env("TMPDIR", tmpdir);
    }
    cmd.env("HOME", data_dir)
        .env("AESVAULT_DIR", data_dir)
        .env("AESVAULT_PASSPHRASE", TEST_PASSPHRASE);
}

/// Runs the binary and returns trimmed stdout, panicking on failure.
pub fn run_ok(data_dir: &Path, args: &[&str]) -> String {
    let output = base_aesvault_command(data_dir)
        .args(args)
        .output()
        .expect("failed to run aesvault");
    assert!(
        output.status.success(),
        "aesvault {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
