//! CLI argument parsing tests
//!
//! These only exercise the clap surface; nothing here starts a server or a
//! browser.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

/// Get the rangepilot binary command
fn rangepilot() -> Command {
    Command::cargo_bin("rangepilot").unwrap()
}

mod help {
    use super::*;

    #[test]
    fn shows_help() {
        rangepilot()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("rangepilot"))
            .stdout(predicate::str::contains("Run the HTTP API server"));
    }

    #[test]
    fn shows_version() {
        rangepilot()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("rangepilot"));
    }

    #[test]
    fn help_lists_the_global_overrides() {
        rangepilot()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--host"))
            .stdout(predicate::str::contains("--port"))
            .stdout(predicate::str::contains("--headless"));
    }
}

mod config_command {
    use super::*;

    #[test]
    fn config_requires_a_subcommand() {
        rangepilot().arg("config").assert().failure();
    }

    #[test]
    fn config_path_prints_the_file_location() {
        rangepilot()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("rangepilot"))
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_prints_the_merged_sections() {
        rangepilot()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[server]"))
            .stdout(predicate::str::contains("[browser]"))
            .stdout(predicate::str::contains("[executor]"));
    }
}

mod serve_command {
    use super::*;

    #[test]
    fn serve_help_mentions_the_server() {
        rangepilot()
            .args(["serve", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("HTTP API server"));
    }

    #[test]
    fn unknown_subcommands_fail() {
        rangepilot().arg("browse").assert().failure();
    }
}
