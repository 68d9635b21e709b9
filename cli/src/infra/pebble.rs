//! Pebble implementation of the `RuntimeGateway` port.
//!
//! Drives the workload's service manager through the `pebble` client binary
//! (which finds its socket via the `PEBBLE` environment variable) and writes
//! artifacts through the container filesystem mounted into the operator.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use caddy_common::{ServicePlan, ServiceRunState};
use tracing::debug;

use crate::application::ports::{CommandRunner, RuntimeGateway};
use crate::domain::GatewayError;
use crate::domain::plan::{LAYER_LABEL, layer};
use crate::infra::fs::write_atomic;

/// stderr fragments meaning the client could not reach the daemon.
const CONNECTION_FAILURES: &[&str] = &["cannot connect", "dial unix", "connection refused"];

/// stderr fragments meaning the named service is not in the plan.
const SERVICE_NOT_FOUND: &[&str] = &["not found", "no matching services"];

const ARTIFACT_MODE: u32 = 0o644;

pub struct PebbleGateway<R> {
    runner: R,
    bin: String,
    container_root: PathBuf,
}

impl<R: CommandRunner> PebbleGateway<R> {
    /// `runner` must already carry `PEBBLE=<dir>` in its environment.
    pub fn new(runner: R, bin: impl Into<String>, container_root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            bin: bin.into(),
            container_root: container_root.into(),
        }
    }

    /// Run `pebble <args>` and return stdout on success.
    async fn pebble(&self, operation: &str, args: &[&str]) -> Result<Vec<u8>, GatewayError> {
        debug!(bin = %self.bin, ?args, "running pebble");
        let output = self
            .runner
            .run(&self.bin, args)
            .await
            .map_err(|e| GatewayError::Unavailable(format!("{e:#}")))?;
        if output.status.success() {
            return Ok(output.stdout);
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if contains_any(&stderr, CONNECTION_FAILURES) {
            return Err(GatewayError::Unavailable(stderr));
        }
        Err(GatewayError::Operation {
            operation: operation.to_string(),
            reason: if stderr.is_empty() {
                format!("pebble exited with {}", output.status)
            } else {
                stderr
            },
        })
    }
}

impl<R: CommandRunner> RuntimeGateway for PebbleGateway<R> {
    async fn is_connectable(&self) -> bool {
        match self.pebble("plan", &["plan"]).await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "pebble not connectable");
                false
            }
        }
    }

    async fn current_plan(&self) -> Result<ServicePlan, GatewayError> {
        let stdout = self.pebble("plan", &["plan"]).await?;
        parse_plan(&String::from_utf8_lossy(&stdout))
    }

    async fn apply_plan(&self, plan: &ServicePlan) -> Result<(), GatewayError> {
        let write_err = |e: anyhow::Error| GatewayError::Operation {
            operation: "add".to_string(),
            reason: format!("{e:#}"),
        };
        let yaml = serde_yaml::to_string(&layer(plan))
            .context("serializing layer")
            .map_err(write_err)?;
        let mut file = tempfile::Builder::new()
            .prefix("caddy-layer-")
            .suffix(".yaml")
            .tempfile()
            .context("creating layer file")
            .map_err(write_err)?;
        file.write_all(yaml.as_bytes())
            .context("writing layer file")
            .map_err(write_err)?;
        let layer_path = file.path().to_string_lossy().into_owned();
        self.pebble("add", &["add", LAYER_LABEL, &layer_path, "--combine"])
            .await?;
        Ok(())
    }

    async fn write_artifact(&self, path: &str, content: &[u8]) -> Result<(), GatewayError> {
        if !self.container_root.is_dir() {
            return Err(GatewayError::Unavailable(format!(
                "container filesystem not mounted at {}",
                self.container_root.display()
            )));
        }
        let target = host_path(&self.container_root, path);
        let content = content.to_vec();
        let to_write_err = |reason: String| GatewayError::Write {
            path: path.to_string(),
            reason,
        };
        tokio::task::spawn_blocking(move || write_atomic(&target, &content, Some(ARTIFACT_MODE)))
            .await
            .map_err(|e| to_write_err(e.to_string()))?
            .map_err(|e| to_write_err(format!("{e:#}")))
    }

    async fn service_state(&self, name: &str) -> Result<ServiceRunState, GatewayError> {
        match self.pebble("services", &["services", name]).await {
            Ok(stdout) => Ok(parse_service_state(&String::from_utf8_lossy(&stdout), name)),
            Err(GatewayError::Operation { reason, .. })
                if contains_any(&reason, SERVICE_NOT_FOUND) =>
            {
                Ok(ServiceRunState::Absent)
            }
            Err(e) => Err(e),
        }
    }

    async fn start(&self, name: &str) -> Result<(), GatewayError> {
        self.pebble("start", &["start", name]).await.map(drop)
    }

    async fn stop(&self, name: &str) -> Result<(), GatewayError> {
        self.pebble("stop", &["stop", name]).await.map(drop)
    }

    async fn restart(&self, name: &str) -> Result<(), GatewayError> {
        self.pebble("restart", &["restart", name]).await.map(drop)
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let lower = haystack.to_ascii_lowercase();
    needles.iter().any(|n| lower.contains(n))
}

/// Parse `pebble plan` output. An empty plan prints `{}` or nothing.
///
/// # Errors
///
/// Returns `GatewayError::Operation` if the output is not a plan.
pub fn parse_plan(yaml: &str) -> Result<ServicePlan, GatewayError> {
    if yaml.trim().is_empty() {
        return Ok(ServicePlan::default());
    }
    serde_yaml::from_str(yaml).map_err(|e| GatewayError::Operation {
        operation: "plan".to_string(),
        reason: format!("unreadable plan: {e}"),
    })
}

/// Parse the `pebble services` table for `name`.
///
/// ```text
/// Service  Startup  Current  Since
/// caddy    enabled  active   today at 10:00 UTC
/// ```
#[must_use]
pub fn parse_service_state(table: &str, name: &str) -> ServiceRunState {
    table
        .lines()
        .skip_while(|l| !l.trim_start().starts_with("Service"))
        .skip(1)
        .filter_map(|l| {
            let mut cols = l.split_whitespace();
            let service = cols.next()?;
            let _startup = cols.next()?;
            Some((service, cols.next()?))
        })
        .find(|(service, _)| *service == name)
        .map_or(ServiceRunState::Absent, |(_, current)| match current {
            "active" => ServiceRunState::Running,
            _ => ServiceRunState::Stopped,
        })
}

/// Where the container's `path` lands under `root`. Exposed for callers that
/// print the artifact location.
#[must_use]
pub fn host_path(root: &Path, path: &str) -> PathBuf {
    root.join(path.trim_start_matches('/'))
}
