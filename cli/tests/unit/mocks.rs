//! Shared mock infrastructure for unit tests.
//!
//! Hand-written recording implementations of the application ports. Each
//! mock keeps a `Mutex`-backed call log so tests can assert exactly which
//! operations a service performed.

#![allow(clippy::expect_used, dead_code)]

use std::collections::{HashMap, VecDeque};
use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use caddy_common::{IngressRequest, ServicePlan, ServiceRunState};
use caddy_operator::application::ports::{
    CommandRunner, ConfigSource, IngressPublisher, OperatorStateStore, PassLock,
    ProgressReporter, RuntimeGateway, StatusSink,
};
use caddy_operator::domain::{DesiredConfig, GatewayError, OperatorState, UnitStatus};

// ── Output helpers ────────────────────────────────────────────────────────────

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: ExitStatus::from_raw(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(stderr: &[u8]) -> Output {
    Output {
        status: ExitStatus::from_raw(1 << 8),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

pub fn cfg(hostname: &str) -> DesiredConfig {
    DesiredConfig {
        hostname: hostname.to_string(),
        ..DesiredConfig::default()
    }
}

// ── Mock: runtime gateway ─────────────────────────────────────────────────────

const READ_ONLY: &[&str] = &["is_connectable", "current_plan", "service_state"];

/// In-memory service manager that records every call.
///
/// `apply_plan` replaces the observed plan, `start`/`restart` mark the
/// service running and `stop` marks it stopped, so consecutive passes see
/// the effects of earlier ones.
pub struct RecordingGateway {
    connectable: Mutex<bool>,
    plan: Mutex<ServicePlan>,
    run_state: Mutex<ServiceRunState>,
    calls: Mutex<Vec<String>>,
    artifacts: Mutex<Vec<(String, Vec<u8>)>>,
    failures: Mutex<HashMap<&'static str, GatewayError>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self {
            connectable: Mutex::new(true),
            plan: Mutex::new(ServicePlan::default()),
            run_state: Mutex::new(ServiceRunState::Absent),
            calls: Mutex::new(Vec::new()),
            artifacts: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    pub fn unreachable() -> Self {
        let gw = Self::new();
        gw.set_connectable(false);
        gw
    }

    pub fn set_connectable(&self, value: bool) {
        *self.connectable.lock().expect("lock") = value;
    }

    pub fn set_run_state(&self, state: ServiceRunState) {
        *self.run_state.lock().expect("lock") = state;
    }

    pub fn set_plan(&self, plan: ServicePlan) {
        *self.plan.lock().expect("lock") = plan;
    }

    pub fn plan(&self) -> ServicePlan {
        self.plan.lock().expect("lock").clone()
    }

    pub fn run_state(&self) -> ServiceRunState {
        *self.run_state.lock().expect("lock")
    }

    /// Make the named operation fail with `err` from now on.
    pub fn fail_on(&self, operation: &'static str, err: GatewayError) {
        self.failures.lock().expect("lock").insert(operation, err);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    /// Calls that change backend or container state.
    pub fn mutating_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !READ_ONLY.contains(&c.as_str()))
            .collect()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls().iter().filter(|c| *c == operation).count()
    }

    pub fn artifacts(&self) -> Vec<(String, Vec<u8>)> {
        self.artifacts.lock().expect("lock").clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().expect("lock").clear();
    }

    fn record(&self, operation: &'static str) -> Result<(), GatewayError> {
        self.calls.lock().expect("lock").push(operation.to_string());
        match self.failures.lock().expect("lock").get(operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl RuntimeGateway for RecordingGateway {
    async fn is_connectable(&self) -> bool {
        self.calls.lock().expect("lock").push("is_connectable".into());
        *self.connectable.lock().expect("lock")
    }

    async fn current_plan(&self) -> Result<ServicePlan, GatewayError> {
        self.record("current_plan")?;
        Ok(self.plan())
    }

    async fn apply_plan(&self, plan: &ServicePlan) -> Result<(), GatewayError> {
        self.record("apply_plan")?;
        self.set_plan(plan.clone());
        Ok(())
    }

    async fn write_artifact(&self, path: &str, content: &[u8]) -> Result<(), GatewayError> {
        self.record("write_artifact")?;
        self.artifacts
            .lock()
            .expect("lock")
            .push((path.to_string(), content.to_vec()));
        Ok(())
    }

    async fn service_state(&self, _name: &str) -> Result<ServiceRunState, GatewayError> {
        self.record("service_state")?;
        Ok(self.run_state())
    }

    async fn start(&self, _name: &str) -> Result<(), GatewayError> {
        self.record("start")?;
        self.set_run_state(ServiceRunState::Running);
        Ok(())
    }

    async fn stop(&self, _name: &str) -> Result<(), GatewayError> {
        self.record("stop")?;
        self.set_run_state(ServiceRunState::Stopped);
        Ok(())
    }

    async fn restart(&self, _name: &str) -> Result<(), GatewayError> {
        self.record("restart")?;
        self.set_run_state(ServiceRunState::Running);
        Ok(())
    }
}

// ── Mock: state store ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStateStore {
    state: Mutex<Option<OperatorState>>,
    fail_saves: Mutex<bool>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Option<OperatorState> {
        self.state.lock().expect("lock").clone()
    }

    pub fn fail_saves(&self) {
        *self.fail_saves.lock().expect("lock") = true;
    }
}

impl OperatorStateStore for MemoryStateStore {
    async fn load_async(&self) -> Result<Option<OperatorState>> {
        Ok(self.state())
    }

    async fn save_async(&self, state: &OperatorState) -> Result<()> {
        if *self.fail_saves.lock().expect("lock") {
            anyhow::bail!("disk full");
        }
        *self.state.lock().expect("lock") = Some(state.clone());
        Ok(())
    }
}

// ── Mock: status sink ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    published: Mutex<Vec<UnitStatus>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<UnitStatus> {
        self.published.lock().expect("lock").clone()
    }

    pub fn last(&self) -> Option<UnitStatus> {
        self.published().last().cloned()
    }
}

impl StatusSink for RecordingSink {
    async fn publish(&self, status: &UnitStatus) -> Result<()> {
        self.published.lock().expect("lock").push(status.clone());
        Ok(())
    }
}

// ── Mock: pass lock ───────────────────────────────────────────────────────────

/// Stands in for the state-dir lock file. `hold` simulates a pass running
/// in another process.
#[derive(Default)]
pub struct MemoryPassLock {
    held_elsewhere: Mutex<bool>,
    broken: Mutex<bool>,
    acquired: Mutex<usize>,
}

impl MemoryPassLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hold(&self) {
        *self.held_elsewhere.lock().expect("lock") = true;
    }

    pub fn break_lock(&self) {
        *self.broken.lock().expect("lock") = true;
    }

    pub fn acquired(&self) -> usize {
        *self.acquired.lock().expect("lock")
    }
}

impl PassLock for MemoryPassLock {
    type Guard = ();

    fn try_acquire(&self) -> Result<Option<()>> {
        if *self.broken.lock().expect("lock") {
            anyhow::bail!("permission denied opening pass.lock");
        }
        if *self.held_elsewhere.lock().expect("lock") {
            return Ok(None);
        }
        *self.acquired.lock().expect("lock") += 1;
        Ok(Some(()))
    }
}

// ── Mock: config source ───────────────────────────────────────────────────────

pub struct StaticConfig(pub DesiredConfig);

impl ConfigSource for StaticConfig {
    async fn desired(&self) -> Result<DesiredConfig> {
        Ok(self.0.clone())
    }
}

pub struct BrokenConfig;

impl ConfigSource for BrokenConfig {
    async fn desired(&self) -> Result<DesiredConfig> {
        anyhow::bail!("invalid value for file-server: maybe")
    }
}

// ── Mock: ingress publisher ───────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingIngress {
    requests: Mutex<Vec<IngressRequest>>,
    fail: bool,
}

impl RecordingIngress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn requests(&self) -> Vec<IngressRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

impl IngressPublisher for RecordingIngress {
    async fn publish(&self, request: &IngressRequest) -> Result<bool> {
        self.requests.lock().expect("lock").push(request.clone());
        if self.fail {
            anyhow::bail!("connection refused");
        }
        Ok(true)
    }
}

// ── Mock: progress reporter ───────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingReporter {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages
            .lock()
            .expect("lock")
            .iter()
            .filter_map(|m| m.strip_prefix("warn: ").map(str::to_string))
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.messages.lock().expect("lock").push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.messages.lock().expect("lock").push(format!("success: {message}"));
    }
    fn warn(&self, message: &str) {
        self.messages.lock().expect("lock").push(format!("warn: {message}"));
    }
}

// ── Mock: command runner ──────────────────────────────────────────────────────

/// Scripted `CommandRunner`: replies are queued per subcommand (first arg).
/// A subcommand with no queued reply gets a spawn error. The call log is
/// shared so it stays readable after the runner moves into an adapter.
#[derive(Default)]
pub struct ScriptedRunner {
    replies: Mutex<HashMap<String, VecDeque<Output>>>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, subcommand: &str, output: Output) -> Self {
        self.replies
            .lock()
            .expect("lock")
            .entry(subcommand.to_string())
            .or_default()
            .push_back(output);
        self
    }

    pub fn call_log(&self) -> Arc<Mutex<Vec<Vec<String>>>> {
        Arc::clone(&self.calls)
    }
}

impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, Duration::from_secs(10))
            .await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        _timeout: Duration,
    ) -> Result<Output> {
        self.calls
            .lock()
            .expect("lock")
            .push(args.iter().map(ToString::to_string).collect());
        let subcommand = args.first().copied().unwrap_or_default();
        self.replies
            .lock()
            .expect("lock")
            .get_mut(subcommand)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| anyhow::anyhow!("failed to spawn {program}"))
    }
}
