//! End-to-end tests of the gridforce binary's exit behaviour.
//!
//! None of these reach a network: every case fails before a transaction is built.

use std::path::Path;
use std::process::{Command, Output};

use tempdir::TempDir;

/// Run `gridforce` in `dir` with an empty environment.
fn gridforce(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gridforce"))
        .args(args)
        .current_dir(dir)
        .env_clear()
        .output()
        .expect("failed to run gridforce")
}

fn last_stderr_line(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or_default()
        .to_string()
}

#[test]
fn test_missing_configuration_exits_non_zero() {
    let dir = TempDir::new("gridforce-cli").unwrap();

    let output = gridforce(dir.path(), &["deploy", "--network", "sepolia"]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(
        last_stderr_line(&output).contains("SEPOLIA_RPC_URL is not set"),
        "unexpected stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_root_cause_is_reported_last() {
    let dir = TempDir::new("gridforce-cli").unwrap();

    let output = gridforce(
        dir.path(),
        &["deploy", "--network", "local", "--artifacts", "missing"],
    );

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("deployed to"));
    assert!(!stdout.contains("Deploying"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load artifact for contract `GridToken`"));
    assert!(last_stderr_line(&output).contains("Artifacts directory not found"));
}

#[test]
fn test_network_keys_are_read_from_dotenv() {
    let dir = TempDir::new("gridforce-cli").unwrap();
    std::fs::write(dir.path().join(".env"), "SEPOLIA_RPC_URL=not-a-url\n").unwrap();

    let output = gridforce(dir.path(), &["deploy", "--network", "sepolia"]);

    // The value from `.env` is seen, so resolution fails on the URL itself.
    assert!(!output.status.success());
    assert!(
        last_stderr_line(&output).contains("invalid RPC URL"),
        "unexpected stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}
