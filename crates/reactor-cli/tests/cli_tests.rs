//! End-to-end tests for the reactor-status binary
//!
//! Only paths that stop before a database connection is needed are covered
//! here; the menu itself is exercised in `shell_tests.rs`.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_flags() {
    let mut cmd = Command::cargo_bin("reactor-status").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--skip-ingest"))
        .stdout(predicate::str::contains("--source-url"))
        .stdout(predicate::str::contains("--verbose"));
}

#[test]
fn test_unknown_flag_is_rejected() {
    let mut cmd = Command::cargo_bin("reactor-status").unwrap();
    cmd.arg("--frobnicate");

    cmd.assert().failure().code(2);
}

#[test]
fn test_zero_port_exits_with_error() {
    let mut cmd = Command::cargo_bin("reactor-status").unwrap();
    cmd.env("REACTOR_DB_PORT", "0");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Database port must be greater than 0"));
}

#[test]
fn test_malformed_timeout_exits_with_error() {
    let mut cmd = Command::cargo_bin("reactor-status").unwrap();
    cmd.env("REACTOR_HTTP_TIMEOUT_SECS", "soon");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("REACTOR_HTTP_TIMEOUT_SECS"));
}

#[test]
fn test_unsafe_table_name_exits_with_error() {
    let mut cmd = Command::cargo_bin("reactor-status").unwrap();
    cmd.env("REACTOR_TABLE", "status; DROP TABLE users");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid table name"));
}

#[test]
fn test_empty_source_url_flag_exits_with_error() {
    let mut cmd = Command::cargo_bin("reactor-status").unwrap();
    cmd.args(["--source-url", ""]);

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Source URL cannot be empty"));
}
