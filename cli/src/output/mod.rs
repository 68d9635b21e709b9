//! Output formatting module

pub mod human;
pub mod json;
pub mod reporter;
pub mod styles;

use anyhow::{Context, Result};
use caddy_common::Layer;
use console::Term;
use owo_colors::OwoColorize as _;
use serde_json::json;

use crate::application::services::actions::{FortuneReport, HostnameReport};
use crate::domain::{ReconcileOutcome, StatusRecord, Trigger};

pub use human::HumanRenderer;
pub use reporter::TerminalReporter;
pub use styles::Styles;

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// Print a warning message prefixed with `⚠`. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print an error message prefixed with `✗` to stderr. Never suppressed.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".style(self.styles.error));
    }

    /// Print an info message prefixed with `ℹ`. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "ℹ".style(self.styles.info));
        }
    }

    /// Print a section header. Suppressed when `quiet`.
    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// Print a key-value pair with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", key.style(self.styles.dim));
        }
    }
}

/// Output renderer selected by `--json`.
pub enum Renderer<'a> {
    Human(HumanRenderer<'a>),
    Json,
}

impl Renderer<'_> {
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_outcome(&self, trigger: Trigger, outcome: &ReconcileOutcome) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_outcome(trigger, outcome);
                Ok(())
            }
            Self::Json => json::print(&json!({
                "event": trigger,
                "outcome": outcome,
                "status": outcome.status(),
            })),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_failure(&self, message: &str, code: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_failure(message);
                Ok(())
            }
            Self::Json => {
                println!("{}", json::format_error(message, code)?);
                Ok(())
            }
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_status(&self, record: Option<&StatusRecord>) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_status(record);
                Ok(())
            }
            Self::Json => json::print(&record),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_history(&self, entries: &[String]) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_history(entries);
                Ok(())
            }
            Self::Json => json::print(&json!({ "hostnames": entries })),
        }
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_plan(&self, layer: &Layer) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_plan(&serde_yaml::to_string(layer).context("serializing layer")?);
                Ok(())
            }
            Self::Json => json::print(layer),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_artifact(&self, content: &str, digest: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_artifact(content, digest);
                Ok(())
            }
            Self::Json => json::print(&json!({ "content": content, "sha256": digest })),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_hostname(&self, report: &HostnameReport) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_hostname(report);
                Ok(())
            }
            Self::Json => json::print(report),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_fortune(&self, report: &FortuneReport) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_fortune(report);
                Ok(())
            }
            Self::Json => json::print(report),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_version(version);
                Ok(())
            }
            Self::Json => json::print(&json!({ "version": version })),
        }
    }
}
