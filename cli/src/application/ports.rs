//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and `caddy_common`, never
//! from `crate::infra`, `crate::commands`, or `crate::output`.

use std::process::Output;

use anyhow::Result;
use caddy_common::{IngressRequest, ServicePlan, ServiceRunState};

use crate::domain::{DesiredConfig, GatewayError, OperatorState, UnitStatus};

// ── Runtime Gateway Port ──────────────────────────────────────────────────────

/// The workload container's service manager plus its filesystem.
///
/// Every fallible call reports `GatewayError::Unavailable` when the backend
/// cannot be reached, so callers can defer instead of fail.
#[allow(async_fn_in_trait)]
pub trait RuntimeGateway {
    /// Cheap reachability check. Never fails; unreachable is `false`.
    async fn is_connectable(&self) -> bool;
    /// The plan the backend is currently running. Empty when none applied.
    async fn current_plan(&self) -> Result<ServicePlan, GatewayError>;
    /// Merge `plan` into the backend under the operator's layer.
    async fn apply_plan(&self, plan: &ServicePlan) -> Result<(), GatewayError>;
    /// Write `content` to `path` inside the workload container.
    async fn write_artifact(&self, path: &str, content: &[u8]) -> Result<(), GatewayError>;
    /// Run-state of `name`. An unknown service is `Absent`, not an error.
    async fn service_state(&self, name: &str) -> Result<ServiceRunState, GatewayError>;
    async fn start(&self, name: &str) -> Result<(), GatewayError>;
    async fn stop(&self, name: &str) -> Result<(), GatewayError>;
    async fn restart(&self, name: &str) -> Result<(), GatewayError>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
}

// ── Configuration Port ────────────────────────────────────────────────────────

/// Source of the desired workload configuration.
#[allow(async_fn_in_trait)]
pub trait ConfigSource {
    /// Load and parse the current configuration snapshot.
    async fn desired(&self) -> Result<DesiredConfig>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── State Ports ───────────────────────────────────────────────────────────────

/// Abstracts operator state persistence (load/save).
#[allow(async_fn_in_trait)]
pub trait OperatorStateStore {
    /// Load the current operator state, returning `None` if no state exists.
    async fn load_async(&self) -> Result<Option<OperatorState>>;
    /// Persist the given operator state.
    async fn save_async(&self, state: &OperatorState) -> Result<()>;
}

/// Exclusion between reconciliation passes running in separate processes.
/// Sync trait: acquisition never waits.
pub trait PassLock {
    /// Held for as long as the guard lives.
    type Guard;
    /// Returns `Ok(None)` when another pass holds the lock.
    fn try_acquire(&self) -> Result<Option<Self::Guard>>;
}

/// Destination for the externally visible unit status.
#[allow(async_fn_in_trait)]
pub trait StatusSink {
    async fn publish(&self, status: &UnitStatus) -> Result<()>;
}

// ── Ingress Port ──────────────────────────────────────────────────────────────

/// Announces the workload's routing requirements to the ingress provider.
#[allow(async_fn_in_trait)]
pub trait IngressPublisher {
    /// Publish `request`. Returns `Ok(false)` when no provider is configured.
    async fn publish(&self, request: &IngressRequest) -> Result<bool>;
}
