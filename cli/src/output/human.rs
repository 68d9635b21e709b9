//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;

use crate::application::services::actions::{FortuneReport, HostnameReport};
use crate::domain::{Action, ReconcileOutcome, StatusRecord, Trigger, UnitStatus};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the result of a reconciliation pass.
    pub fn render_outcome(&self, trigger: Trigger, outcome: &ReconcileOutcome) {
        let status = outcome.status();
        match outcome.action {
            Action::Deferred => self.ctx.warn(&format!(
                "{trigger}: deferred at {}",
                outcome.reached
            )),
            Action::None => self.ctx.success(&format!("{trigger}: already converged")),
            action => self.ctx.success(&format!("{trigger}: {action}")),
        }
        self.render_unit_status(&status);
        if outcome.plan_changed {
            self.ctx.kv("Plan:", "updated");
        }
        if outcome.artifact_changed {
            self.ctx.kv("Caddyfile:", "rewritten");
        }
    }

    /// Render a non-retryable failure. Never suppressed.
    pub fn render_failure(&self, message: &str) {
        self.ctx.error(message);
    }

    /// Render the last published status.
    pub fn render_status(&self, record: Option<&StatusRecord>) {
        let Some(record) = record else {
            self.ctx.info("No status published yet");
            return;
        };
        self.render_unit_status(&record.status);
        self.ctx.kv(
            "Updated:",
            &record.updated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );
    }

    fn render_unit_status(&self, status: &UnitStatus) {
        if self.ctx.quiet {
            return;
        }
        let label = status.kind.to_string();
        let label = label.style(self.ctx.styles.for_status(status.kind));
        match status.message.as_deref() {
            Some(m) if !m.is_empty() => println!("  Status:  {label} ({m})"),
            _ => println!("  Status:  {label}"),
        }
    }

    /// Render the hostname history.
    pub fn render_history(&self, entries: &[String]) {
        if entries.is_empty() {
            self.ctx.info("No hostnames recorded yet");
            return;
        }
        self.ctx.header("Hostnames:");
        for entry in entries {
            if !self.ctx.quiet {
                println!("    {entry}");
            }
        }
    }

    /// Render the desired layer as YAML.
    pub fn render_plan(&self, yaml: &str) {
        print!("{yaml}");
    }

    /// Render the rendered Caddyfile followed by its digest.
    pub fn render_artifact(&self, content: &str, digest: &str) {
        print!("{content}");
        if !self.ctx.quiet {
            eprintln!("{}", format!("sha256:{digest}").style(self.ctx.styles.dim));
        }
    }

    pub fn render_hostname(&self, report: &HostnameReport) {
        self.ctx.kv("Current:", &report.current);
        self.render_history(&report.history);
    }

    pub fn render_fortune(&self, report: &FortuneReport) {
        println!("{}", report.fortune);
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        println!("caddy-operator {version}");
    }
}
