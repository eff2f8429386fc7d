//! End-to-end tests for CLI exit codes.
//!
//! - Exit code 0: Success
//! - Exit code 1: Any failure, including paths the user may not ask about
//! - Exit code 2: Invalid command-line usage (handled by clap)

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

/// Exit code 0 is returned for --help.
#[test]
fn test_exit_code_help() {
    let mut cmd = cargo_bin_cmd!("git-meta");

    cmd.arg("--help")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("diff-index"))
        .stdout(predicate::str::contains("ls-files"))
        .stdout(predicate::str::contains("update-index"))
        .stdout(predicate::str::contains("check-attr"));
}

/// Exit code 0 is returned for --version.
#[test]
fn test_exit_code_version() {
    let mut cmd = cargo_bin_cmd!("git-meta");

    cmd.arg("--version")
        .assert()
        .code(0)
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// Exit code 2 is returned for an unknown subcommand.
#[test]
fn test_exit_code_unknown_subcommand() {
    let mut cmd = cargo_bin_cmd!("git-meta");

    cmd.arg("no-such-command").assert().code(2);
}

/// Exit code 2 is returned when diff-index is missing its tree.
#[test]
fn test_exit_code_missing_tree_ish() {
    let mut cmd = cargo_bin_cmd!("git-meta");

    cmd.arg("diff-index").assert().code(2);
}

/// Exit code 1 is returned outside any repository.
#[test]
fn test_exit_code_outside_repository() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mut cmd = cargo_bin_cmd!("git-meta");

    cmd.current_dir(temp.path())
        .env("GIT_CEILING_DIRECTORIES", temp.path())
        .arg("ls-files")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

/// Exit code 1 is returned for a missing -C directory.
#[test]
fn test_exit_code_missing_directory() {
    let mut cmd = cargo_bin_cmd!("git-meta");

    cmd.args(["-C", "/definitely/not/here/git-meta", "ls-files"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Cannot access"));
}
