//! End-to-end tests for `caddy-operator reconcile`.
//!
//! Tests that need a reachable backend install a fake `pebble` shell script
//! into the sandbox. They are serialized because spawning while another
//! test writes an executable can fail with ETXTBSY.

#![allow(clippy::expect_used)]

use std::process::Stdio;
use std::time::Duration;

use predicates::prelude::*;
use serial_test::serial;

use crate::sandbox::Sandbox;

const WAITING: &str = "waiting for Pebble in workload container";

fn json_stdout(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is valid JSON")
}

// --- Unreachable backend ---

#[test]
fn test_unreachable_backend_exits_tempfail() {
    let sandbox = Sandbox::new();
    sandbox.write_config("hostname: example.com\n");

    sandbox
        .operator(None)
        .args(["reconcile", "--event", "workload-ready"])
        .assert()
        .code(75)
        .stdout(predicate::str::contains("deferred"));

    let status = sandbox.status_json();
    assert_eq!(status["status"], "waiting");
    assert_eq!(status["message"], WAITING);
}

#[test]
fn test_unreachable_backend_still_records_history() {
    let sandbox = Sandbox::new();
    sandbox.write_config("hostname: example.com\n");

    sandbox
        .operator(None)
        .args(["reconcile", "--event", "config-changed"])
        .assert()
        .code(75);

    let output = sandbox
        .operator(None)
        .args(["history", "--json"])
        .output()
        .expect("run");
    assert_eq!(
        json_stdout(&output)["hostnames"],
        serde_json::json!(["example.com"])
    );
}

#[test]
fn test_deferred_json_outcome() {
    let sandbox = Sandbox::new();
    let output = sandbox
        .operator(None)
        .args(["reconcile", "--event", "update-status", "--json"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(75));
    let json = json_stdout(&output);
    assert_eq!(json["event"], "update-status");
    assert_eq!(json["outcome"]["phase"], "deferred");
    assert_eq!(json["status"]["status"], "waiting");
}

#[test]
fn test_status_command_shows_published_status() {
    let sandbox = Sandbox::new();
    sandbox
        .operator(None)
        .args(["reconcile", "--event", "update-status"])
        .assert()
        .code(75);

    sandbox
        .operator(None)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("waiting"))
        .stdout(predicate::str::contains(WAITING));
}

// --- Reachable backend (fake pebble) ---

#[cfg(unix)]
#[test]
#[serial]
fn test_first_pass_starts_then_converges() {
    let sandbox = Sandbox::new();
    let pebble = sandbox.install_fake_pebble();
    sandbox.write_config("hostname: example.com\n");

    sandbox
        .operator(Some(&pebble))
        .args(["reconcile", "--event", "config-changed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config-changed: start"));

    assert!(sandbox.caddyfile().contains("http://example.com:8080"));
    assert_eq!(sandbox.pebble_calls(), ["add", "start"]);
    assert_eq!(sandbox.status_json()["status"], "active");

    sandbox.clear_pebble_calls();
    sandbox
        .operator(Some(&pebble))
        .args(["reconcile", "--event", "update-status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already converged"));
    assert!(sandbox.pebble_calls().is_empty());
}

#[cfg(unix)]
#[test]
#[serial]
fn test_hostname_change_restarts_once() {
    let sandbox = Sandbox::new();
    let pebble = sandbox.install_fake_pebble();
    sandbox.write_config("hostname: example.com\n");
    sandbox
        .operator(Some(&pebble))
        .args(["reconcile", "--event", "config-changed"])
        .assert()
        .success();
    sandbox.clear_pebble_calls();

    sandbox.write_config("hostname: new.example.com\n");
    let output = sandbox
        .operator(Some(&pebble))
        .args(["reconcile", "--event", "config-changed", "--json"])
        .output()
        .expect("run");

    assert!(output.status.success());
    let json = json_stdout(&output);
    assert_eq!(json["outcome"]["action"], "restart");
    assert_eq!(json["status"]["status"], "active");
    assert_eq!(sandbox.pebble_calls(), ["add", "restart"]);
    assert!(sandbox.caddyfile().contains("new.example.com"));

    let history = sandbox
        .operator(None)
        .args(["action", "hostname", "--json"])
        .output()
        .expect("run");
    assert_eq!(
        json_stdout(&history)["history"],
        serde_json::json!(["example.com", "new.example.com"])
    );
}

#[cfg(unix)]
#[test]
#[serial]
fn test_invalid_hostname_fails_without_backend_changes() {
    let sandbox = Sandbox::new();
    let pebble = sandbox.install_fake_pebble();
    sandbox.write_config("hostname: \"bad host\"\n");

    let output = sandbox
        .operator(Some(&pebble))
        .args(["reconcile", "--event", "update-status", "--json"])
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
    let json = json_stdout(&output);
    assert_eq!(json["error"], true);
    assert_eq!(json["code"], "reconcile_failed");
    assert!(sandbox.pebble_calls().is_empty());
    assert!(!sandbox.path("container/etc/caddy/Caddyfile").exists());

    let status = sandbox.status_json();
    assert_eq!(status["status"], "error");
    assert!(
        status["message"]
            .as_str()
            .is_some_and(|m| m.contains("hostname"))
    );
}

#[cfg(unix)]
#[test]
#[serial]
fn test_file_server_toggle_rewrites_caddyfile() {
    let sandbox = Sandbox::new();
    let pebble = sandbox.install_fake_pebble();
    sandbox.write_config("hostname: example.com\n");
    sandbox
        .operator(Some(&pebble))
        .args(["reconcile", "--event", "config-changed"])
        .assert()
        .success();
    assert!(sandbox.caddyfile().contains("respond"));

    sandbox.write_config("hostname: example.com\nfile-server: true\n");
    sandbox
        .operator(Some(&pebble))
        .args(["reconcile", "--event", "config-changed"])
        .assert()
        .success();

    let caddyfile = sandbox.caddyfile();
    assert!(caddyfile.contains("file_server"));
    assert!(!caddyfile.contains("respond"));
}

// --- Overlapping passes ---

#[cfg(unix)]
#[test]
#[serial]
fn test_overlapping_pass_defers_while_first_holds_the_lock() {
    let sandbox = Sandbox::new();
    let pebble = sandbox.install_fake_pebble();
    sandbox.write_config("hostname: example.com\n");
    std::fs::write(sandbox.path("pebble/slow"), "").expect("mark slow");

    let mut first = sandbox
        .std_operator(Some(&pebble))
        .args(["reconcile", "--event", "config-changed"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn first pass");
    assert!(
        sandbox.wait_for("pebble/busy", Duration::from_secs(10)),
        "first pass never reached the backend"
    );

    let output = sandbox
        .operator(Some(&pebble))
        .args(["reconcile", "--event", "config-changed", "--json"])
        .output()
        .expect("run second pass");
    let first_status = first.wait().expect("first pass exits");

    assert_eq!(output.status.code(), Some(75));
    let json = json_stdout(&output);
    assert_eq!(json["outcome"]["phase"], "deferred");
    assert_eq!(json["outcome"]["reason"], "another reconciliation pass is running");
    assert_eq!(first_status.code(), Some(0));
    assert_eq!(sandbox.pebble_calls(), vec!["add", "start"]);
    assert_eq!(sandbox.status_json()["status"], "active");
}

// --- Template override ---

#[test]
fn test_unreadable_template_override_publishes_error() {
    let sandbox = Sandbox::new();
    sandbox.write_config("hostname: example.com\n");
    let missing = sandbox.path("no-such.tmpl");

    sandbox
        .operator(None)
        .env("CADDY_OPERATOR_TEMPLATE", &missing)
        .args(["reconcile", "--event", "update-status"])
        .assert()
        .code(1);

    let status = sandbox.status_json();
    assert_eq!(status["status"], "error");
    assert!(
        status["message"]
            .as_str()
            .is_some_and(|m| m.contains("no-such.tmpl"))
    );
}
