//! Integration tests for the `rosgate` CLI binary.
//!
//! These validate argument parsing, help output, and config-level error
//! handling -- all without requiring a live router.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `rosgate` binary with env isolation.
///
/// Points the config path at a nonexistent file so tests never touch the
/// user's real configuration.
fn rosgate_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("rosgate");
    cmd.env("ROSGATE_CONFIG", "/tmp/rosgate-test-nonexistent/config.toml")
        .env_remove("RUST_LOG");
    cmd
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = rosgate_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "Expected 'Usage':\n{stderr}");
}

#[test]
fn test_help_flag() {
    rosgate_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("call")
            .and(predicate::str::contains("renew"))
            .and(predicate::str::contains("failover")),
    );
}

#[test]
fn test_version_flag() {
    rosgate_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rosgate"));
}

// ── Config / lookup errors ──────────────────────────────────────────

#[test]
fn test_unknown_router_fails_with_lookup_error() {
    rosgate_cmd()
        .args(["call", "no-such-router", "ip/route/print"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Router not found"));
}

#[test]
fn test_invalid_method_is_rejected() {
    rosgate_cmd()
        .args(["call", "r1", "ip/route", "--method", "TRACE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported method"));
}

#[test]
fn test_invalid_json_body_is_rejected() {
    rosgate_cmd()
        .args([
            "call",
            "r1",
            "queue/simple",
            "--method",
            "PUT",
            "--data",
            "{not json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid JSON"));
}

#[test]
fn test_renew_requires_subscriber_flags() {
    rosgate_cmd()
        .args(["renew", "r1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--subscriber"));
}

#[test]
fn test_failover_enable_disable_conflict() {
    rosgate_cmd()
        .args(["failover", "r1", "--enable", "--disable"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
