//! Application service: the reconciliation pass.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use caddy_common::{ServicePlan, ServiceRunState};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::application::ports::{
    ConfigSource, IngressPublisher, OperatorStateStore, PassLock, ProgressReporter,
    RuntimeGateway, StatusSink,
};
use crate::application::services::{history::HistoryTracker, ingress};
use crate::domain::plan::{CADDYFILE_PATH, SERVICE_NAME, build_plan};
use crate::domain::render::{artifact_digest, render_with};
use crate::domain::status::APPLYING;
use crate::domain::{
    Action, DesiredConfig, GatewayError, Phase, ReconcileError, ReconcileOutcome, Trigger,
    UnitStatus,
};

pub const PASS_IN_PROGRESS: &str = "another reconciliation pass is running";

/// Serialized entry point for reconciliation passes.
///
/// Each pass holds the internal mutex and the cross-process pass lock for
/// its full duration. Triggers in the same process queue on the mutex; a
/// pass in another process makes this one defer.
pub struct Reconciler<'a, G, S, T, L> {
    gateway: &'a G,
    store: &'a S,
    sink: &'a T,
    pass_lock: &'a L,
    template: &'a str,
    lock: Mutex<()>,
}

impl<'a, G, S, T, L> Reconciler<'a, G, S, T, L>
where
    G: RuntimeGateway,
    S: OperatorStateStore,
    T: StatusSink,
    L: PassLock,
{
    pub fn new(
        gateway: &'a G,
        store: &'a S,
        sink: &'a T,
        pass_lock: &'a L,
        template: &'a str,
    ) -> Self {
        Self {
            gateway,
            store,
            sink,
            pass_lock,
            template,
            lock: Mutex::new(()),
        }
    }

    /// Handle one external trigger.
    ///
    /// Loads the configuration snapshot, records history and announces
    /// ingress on `config-changed`, then runs a pass.
    ///
    /// # Errors
    ///
    /// Returns an error for non-retryable failures. A backend that is not
    /// ready yet, or a pass already running elsewhere, yields `Ok` with a
    /// deferred outcome.
    pub async fn handle(
        &self,
        trigger: Trigger,
        source: &impl ConfigSource,
        ingress_publisher: &impl IngressPublisher,
        reporter: &impl ProgressReporter,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let _guard = self.lock.lock().await;
        let _held = match self.pass_lock.try_acquire() {
            Ok(Some(held)) => held,
            Ok(None) => return Ok(Self::busy()),
            Err(e) => return self.fail(ReconcileError::State(e), Phase::Pending).await,
        };
        debug!(%trigger, "handling trigger");

        let cfg = match source.desired().await {
            Ok(cfg) => cfg,
            Err(e) => {
                let err = ReconcileError::Config(format!("{e:#}"));
                return self.fail(err, Phase::Pending).await;
            }
        };

        if trigger.is_config_change() {
            match HistoryTracker::new(self.store).record(&cfg.hostname).await {
                Ok(true) => reporter.step(&format!("recorded new hostname {}", cfg.hostname)),
                Ok(false) => {}
                Err(e) => {
                    let cause = format!("{e:#}");
                    warn!(error = %cause, hostname = %cfg.hostname, "cannot record hostname history");
                    reporter.warn(&format!("hostname history not saved: {cause}"));
                }
            }
            ingress::announce(ingress_publisher, &cfg, reporter).await;
        }

        self.pass(&cfg, reporter).await
    }

    /// Run one pass for an already-loaded snapshot.
    ///
    /// # Errors
    ///
    /// See [`Reconciler::handle`].
    pub async fn reconcile(
        &self,
        cfg: &DesiredConfig,
        reporter: &impl ProgressReporter,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let _guard = self.lock.lock().await;
        let _held = match self.pass_lock.try_acquire() {
            Ok(Some(held)) => held,
            Ok(None) => return Ok(Self::busy()),
            Err(e) => return self.fail(ReconcileError::State(e), Phase::Pending).await,
        };
        self.pass(cfg, reporter).await
    }

    async fn pass(
        &self,
        cfg: &DesiredConfig,
        reporter: &impl ProgressReporter,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let mut reached = Phase::Pending;
        let desired = build_plan(cfg);

        enter(&mut reached, Phase::Connecting);
        if !self.gateway.is_connectable().await {
            return Ok(self.defer("backend not connectable", reached).await);
        }

        let artifact = match render_with(self.template, cfg) {
            Ok(bytes) => bytes,
            Err(e) => return self.fail(e.into(), reached).await,
        };

        match self.converge(&desired, &artifact, reporter, &mut reached).await {
            Ok(outcome) => {
                self.publish(&outcome.status()).await;
                Ok(outcome)
            }
            Err(ReconcileError::Gateway(e)) if e.is_transient() => {
                Ok(self.defer(&e.to_string(), reached).await)
            }
            Err(e) => self.fail(e, reached).await,
        }
    }

    async fn converge(
        &self,
        desired: &ServicePlan,
        artifact: &[u8],
        reporter: &impl ProgressReporter,
        reached: &mut Phase,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        enter(reached, Phase::Diffing);
        let current = self.gateway.current_plan().await?;
        let mut state = self
            .store
            .load_async()
            .await
            .map_err(ReconcileError::State)?
            .unwrap_or_default();

        let digest = artifact_digest(artifact);
        let plan_changed = current != *desired;
        let artifact_changed = state.artifact_sha256.as_deref() != Some(digest.as_str());
        debug!(plan_changed, artifact_changed, "diffed desired against observed");

        if !plan_changed && !artifact_changed {
            info!("caddy already converged");
            return Ok(ReconcileOutcome::converged());
        }

        enter(reached, Phase::Applying);
        self.publish(&UnitStatus::maintenance(APPLYING)).await;
        reporter.step(APPLYING);

        self.gateway.write_artifact(CADDYFILE_PATH, artifact).await?;
        self.gateway.apply_plan(desired).await?;

        let action = match self.gateway.service_state(SERVICE_NAME).await? {
            ServiceRunState::Running => {
                self.gateway.restart(SERVICE_NAME).await?;
                Action::Restart
            }
            ServiceRunState::Stopped | ServiceRunState::Absent => {
                self.gateway.start(SERVICE_NAME).await?;
                Action::Start
            }
        };

        state.artifact_sha256 = Some(digest);
        state.touch();
        self.store
            .save_async(&state)
            .await
            .map_err(ReconcileError::State)?;

        info!(%action, plan_changed, artifact_changed, "applied caddy configuration");
        reporter.success(&format!("caddy configured ({action})"));
        Ok(ReconcileOutcome::applied(action, plan_changed, artifact_changed))
    }

    /// The other pass publishes the status, so this one stays silent.
    fn busy() -> ReconcileOutcome {
        info!(reason = PASS_IN_PROGRESS, "deferring");
        ReconcileOutcome::deferred(PASS_IN_PROGRESS, Phase::Pending)
    }

    async fn defer(&self, reason: &str, reached: Phase) -> ReconcileOutcome {
        info!(reason, %reached, "deferring until pebble is ready");
        let outcome = ReconcileOutcome::deferred(reason, reached);
        self.publish(&outcome.status()).await;
        outcome
    }

    async fn fail(
        &self,
        err: ReconcileError,
        reached: Phase,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        match &err {
            ReconcileError::Gateway(GatewayError::Write { path, .. }) => {
                error!(path = %path, %reached, error = %err, "reconciliation failed");
            }
            ReconcileError::Gateway(GatewayError::Operation { operation, .. }) => {
                error!(service = SERVICE_NAME, operation = %operation, %reached, error = %err, "reconciliation failed");
            }
            _ => error!(%reached, error = %err, "reconciliation failed"),
        }
        let outcome = ReconcileOutcome::failed(err.to_string(), reached);
        self.publish(&outcome.status()).await;
        Err(err)
    }

    async fn publish(&self, status: &UnitStatus) {
        if let Err(e) = self.sink.publish(status).await {
            let cause = format!("{e:#}");
            warn!(error = %cause, "cannot publish status");
        }
    }
}

fn enter(reached: &mut Phase, next: Phase) {
    debug!(phase = %next, "entering phase");
    *reached = next;
}
