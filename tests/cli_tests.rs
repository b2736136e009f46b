//! CLI integration tests for `taskboard`.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn taskboard() -> Command {
    cargo_bin_cmd!("taskboard")
}

mod cli_basics {
    use super::*;

    #[test]
    fn test_taskboard_help() {
        taskboard()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("serve"))
            .stdout(predicate::str::contains("watch"));
    }

    #[test]
    fn test_taskboard_version() {
        taskboard()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_serve_help_lists_flags() {
        taskboard()
            .args(["serve", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--host"))
            .stdout(predicate::str::contains("--port"))
            .stdout(predicate::str::contains("--dev"));
    }

    #[test]
    fn test_watch_help_lists_url() {
        taskboard()
            .args(["watch", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--url"));
    }

    #[test]
    fn test_missing_subcommand_fails() {
        taskboard().assert().failure();
    }
}

mod configuration {
    use super::*;

    #[test]
    fn test_missing_config_file_fails() {
        let dir = TempDir::new().unwrap();
        taskboard()
            .current_dir(dir.path())
            .args(["--config", "nope.toml", "serve"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("nope.toml"));
    }

    #[test]
    fn test_malformed_config_file_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("taskboard.toml"), "[server\nport = ").unwrap();
        taskboard()
            .current_dir(dir.path())
            .arg("serve")
            .assert()
            .failure()
            .stderr(predicate::str::contains("taskboard.toml"));
    }

    #[test]
    fn test_invalid_port_env_fails() {
        let dir = TempDir::new().unwrap();
        taskboard()
            .current_dir(dir.path())
            .env("TASKBOARD_PORT", "not-a-port")
            .arg("serve")
            .assert()
            .failure()
            .stderr(predicate::str::contains("TASKBOARD_PORT"));
    }

    #[test]
    fn test_invalid_keepalive_config_fails_before_binding() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("taskboard.toml"),
            "[server]\nping_interval_secs = 30\npong_timeout_secs = 10\n",
        )
        .unwrap();
        taskboard()
            .current_dir(dir.path())
            .env_remove("TASKBOARD_PORT")
            .env_remove("TASKBOARD_HOST")
            .arg("serve")
            .assert()
            .failure()
            .stderr(predicate::str::contains("pong_timeout_secs"));
    }
}

mod watch {
    use super::*;

    #[test]
    fn test_watch_unreachable_server_fails() {
        let dir = TempDir::new().unwrap();
        taskboard()
            .current_dir(dir.path())
            .args(["watch", "--url", "ws://127.0.0.1:9/ws"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("ws://127.0.0.1:9/ws"));
    }
}
