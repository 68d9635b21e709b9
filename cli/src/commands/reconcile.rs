//! `caddy-operator reconcile`: run one reconciliation pass for an event.

use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, ValueEnum};

use crate::app::AppContext;
use crate::application::ports::StatusSink;
use crate::application::services::Reconciler;
use crate::domain::{Trigger, UnitStatus};

/// Exit code telling the event source to redeliver later (`EX_TEMPFAIL`).
pub const EXIT_DEFERRED: u8 = 75;

/// Arguments for the reconcile command.
#[derive(Args)]
pub struct ReconcileArgs {
    /// Event that triggered this pass
    #[arg(long, value_enum)]
    pub event: EventArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EventArg {
    /// The workload configuration was edited
    ConfigChanged,
    /// The workload container's service manager became reachable
    WorkloadReady,
    /// Periodic status refresh
    UpdateStatus,
}

impl From<EventArg> for Trigger {
    fn from(arg: EventArg) -> Self {
        match arg {
            EventArg::ConfigChanged => Self::ConfigChanged,
            EventArg::WorkloadReady => Self::WorkloadReady,
            EventArg::UpdateStatus => Self::UpdateStatus,
        }
    }
}

/// Run the reconcile command.
///
/// Exits 0 when converged, 75 when deferred, and 1 on failure.
///
/// # Errors
///
/// Returns an error if output fails.
pub async fn run(app: &AppContext, args: &ReconcileArgs) -> Result<ExitCode> {
    let renderer = app.renderer();
    let sink = app.status_file();
    let template = match app.template() {
        Ok(template) => template,
        Err(e) => {
            let cause = format!("{e:#}");
            tracing::error!(error = %cause, "cannot load caddyfile template");
            if let Err(e) = sink.publish(&UnitStatus::error(cause.clone())).await {
                let publish_error = format!("{e:#}");
                tracing::warn!(error = %publish_error, "cannot publish status");
            }
            renderer.render_failure(&cause, "template_unreadable")?;
            return Ok(ExitCode::FAILURE);
        }
    };
    let gateway = app.gateway();
    let store = app.state_store();
    let pass_lock = app.pass_lock();
    let reconciler = Reconciler::new(&gateway, &store, &sink, &pass_lock, &template);

    let trigger = Trigger::from(args.event);
    let result = reconciler
        .handle(trigger, &app.config_source(), &app.ingress(), &app.reporter())
        .await;

    match result {
        Ok(outcome) => {
            renderer.render_outcome(trigger, &outcome)?;
            if outcome.is_deferred() {
                Ok(ExitCode::from(EXIT_DEFERRED))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Err(e) => {
            renderer.render_failure(&e.to_string(), "reconcile_failed")?;
            Ok(ExitCode::FAILURE)
        }
    }
}
