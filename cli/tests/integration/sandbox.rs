//! Isolated filesystem layout for driving the binary.

#![allow(clippy::expect_used, dead_code)]

use std::path::{Path, PathBuf};

use std::time::{Duration, Instant};

use assert_cmd::Command;
use tempfile::TempDir;

/// Stand-in for the `pebble` client. Keeps its plan and run-state under
/// `$PEBBLE` and appends every mutating subcommand to `$PEBBLE/calls`.
/// While `$PEBBLE/slow` exists, `services` marks `$PEBBLE/busy` and stalls.
const FAKE_PEBBLE: &str = r#"#!/bin/sh
state="$PEBBLE"
case "$1" in
  plan)
    if [ -f "$state/plan.yaml" ]; then cat "$state/plan.yaml"; else echo "{}"; fi
    ;;
  add)
    echo "add" >> "$state/calls"
    cp "$3" "$state/plan.yaml"
    ;;
  services)
    if [ -f "$state/slow" ]; then
      touch "$state/busy"
      sleep 2
    fi
    if [ -f "$state/running" ]; then
      printf 'Service  Startup  Current  Since\ncaddy    enabled  active   today at 10:00 UTC\n'
    else
      echo "error: service \"$2\" not found" >&2
      exit 1
    fi
    ;;
  start|restart)
    echo "$1" >> "$state/calls"
    touch "$state/running"
    ;;
  stop)
    echo "stop" >> "$state/calls"
    rm -f "$state/running"
    ;;
  *)
    echo "error: unknown command $1" >&2
    exit 2
    ;;
esac
"#;

/// Temp directories for operator state, workload config, the Pebble state
/// directory and the mounted container filesystem.
pub struct Sandbox {
    root: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        for dir in ["home", "state", "pebble", "container"] {
            std::fs::create_dir_all(root.path().join(dir)).expect("mkdir");
        }
        Self { root }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    pub fn write_config(&self, yaml: &str) {
        std::fs::write(self.path("config.yaml"), yaml).expect("write config");
    }

    /// Install the fake `pebble` client and return its path.
    #[cfg(unix)]
    pub fn install_fake_pebble(&self) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let bin = self.path("pebble-bin");
        std::fs::write(&bin, FAKE_PEBBLE).expect("write script");
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).expect("chmod");
        bin
    }

    pub fn caddyfile(&self) -> String {
        std::fs::read_to_string(self.path("container/etc/caddy/Caddyfile")).expect("Caddyfile")
    }

    /// Mutating pebble calls recorded by the fake client.
    pub fn pebble_calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.path("pebble/calls"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn clear_pebble_calls(&self) {
        let _ = std::fs::remove_file(self.path("pebble/calls"));
    }

    pub fn status_json(&self) -> serde_json::Value {
        let raw = std::fs::read_to_string(self.path("state/status.json")).expect("status.json");
        serde_json::from_str(&raw).expect("valid status json")
    }

    /// Wait until `rel` exists, giving up after `timeout`.
    pub fn wait_for(&self, rel: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.path(rel).exists() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        false
    }

    /// The binary wired to this sandbox. `pebble_bin` defaults to a path
    /// that does not exist, which leaves the backend unreachable.
    pub fn operator(&self, pebble_bin: Option<&Path>) -> Command {
        Command::from_std(self.std_operator(pebble_bin))
    }

    /// Like [`Sandbox::operator`], for tests that spawn without waiting.
    pub fn std_operator(&self, pebble_bin: Option<&Path>) -> std::process::Command {
        let mut cmd = std::process::Command::new(assert_cmd::cargo::cargo_bin!("caddy-operator"));
        let missing = self.path("no-such-pebble");
        cmd.env_clear()
            .env("PATH", std::env::var_os("PATH").unwrap_or_default())
            .env("HOME", self.path("home"))
            .env("NO_COLOR", "1")
            .env("CADDY_OPERATOR_CONFIG", self.path("config.yaml"))
            .env("CADDY_OPERATOR_STATE_DIR", self.path("state"))
            .env("CADDY_OPERATOR_PEBBLE_DIR", self.path("pebble"))
            .env("CADDY_OPERATOR_CONTAINER_ROOT", self.path("container"))
            .env("CADDY_OPERATOR_PEBBLE_BIN", pebble_bin.unwrap_or(&missing));
        cmd
    }
}
