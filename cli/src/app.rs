//! Application context: unified state passed to every command handler.
//!
//! `AppContext` owns the output context, operator settings, and the resolved
//! on-disk locations. Adapters are built on demand from these settings.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use caddy_common::OperatorSettings;

use crate::infra::assets;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::{YamlConfigSource, config_path};
use crate::infra::ingress::HttpIngressPublisher;
use crate::infra::lock::StateDirLock;
use crate::infra::pebble::PebbleGateway;
use crate::infra::state::{StateManager, state_dir};
use crate::infra::status::StatusFile;
use crate::output::{HumanRenderer, OutputContext, Renderer, TerminalReporter};

/// Prefix for every operator setting in the environment.
pub const ENV_PREFIX: &str = "CADDY_OPERATOR_";

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    /// Workload config file (`--config` / `CADDY_OPERATOR_CONFIG`).
    pub config: Option<PathBuf>,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Settings loaded from `CADDY_OPERATOR_*`.
    pub settings: OperatorSettings,
    /// Directory holding `state.json`, `status.json` and `pass.lock`.
    pub state_dir: PathBuf,
    /// Workload config file.
    pub config_path: PathBuf,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment holds a malformed setting or the
    /// home directory cannot be determined.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let settings: OperatorSettings = envy::prefixed(ENV_PREFIX)
            .from_env()
            .with_context(|| format!("invalid {ENV_PREFIX}* environment settings"))?;
        Self::with_settings(flags, settings)
    }

    /// Construct an `AppContext` from explicit settings (used in tests).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory is needed but cannot be determined.
    pub fn with_settings(flags: &AppFlags, settings: OperatorSettings) -> Result<Self> {
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        // Progress lines would corrupt JSON on stdout.
        let quiet = flags.output.quiet || flags.output.json;
        let state_dir = state_dir(settings.state_dir.as_deref())?;
        let config_path = config_path(flags.config.as_deref())?;
        tracing::debug!(
            state_dir = %state_dir.display(),
            config = %config_path.display(),
            pebble_dir = %settings.pebble_dir.display(),
            "settings resolved"
        );
        Ok(Self {
            output: OutputContext::new(flags.output.no_color, quiet),
            mode,
            settings,
            state_dir,
            config_path,
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json,
        }
    }

    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }

    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.settings.command_timeout_secs)
    }

    /// Pebble-backed runtime gateway.
    #[must_use]
    pub fn gateway(&self) -> PebbleGateway<TokioCommandRunner> {
        let runner = TokioCommandRunner::new(self.command_timeout())
            .with_env("PEBBLE", self.settings.pebble_dir.to_string_lossy());
        PebbleGateway::new(
            runner,
            self.settings.pebble_bin.clone(),
            self.settings.container_root.clone(),
        )
    }

    #[must_use]
    pub fn state_store(&self) -> StateManager {
        StateManager::in_dir(&self.state_dir)
    }

    #[must_use]
    pub fn status_file(&self) -> StatusFile {
        StatusFile::in_dir(&self.state_dir)
    }

    /// Cross-process lock serializing reconciliation passes.
    #[must_use]
    pub fn pass_lock(&self) -> StateDirLock {
        StateDirLock::in_dir(&self.state_dir)
    }

    #[must_use]
    pub fn config_source(&self) -> YamlConfigSource {
        YamlConfigSource::new(self.config_path.clone())
    }

    #[must_use]
    pub fn ingress(&self) -> HttpIngressPublisher {
        HttpIngressPublisher::new(self.settings.ingress_url.clone(), self.command_timeout())
    }

    /// The Caddyfile template in effect.
    ///
    /// # Errors
    ///
    /// Returns an error if an override template is configured but unreadable.
    pub fn template(&self) -> Result<String> {
        assets::load_template(self.settings.template.as_deref())
    }
}
