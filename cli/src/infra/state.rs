//! Infrastructure implementation of the `OperatorStateStore` port.
//!
//! `StateManager` provides async load/save using `tokio::task::spawn_blocking`
//! with atomic write (temp file + rename) to prevent state corruption.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::OperatorStateStore;
use crate::domain::OperatorState;
use crate::infra::fs::write_atomic;

pub const STATE_FILE: &str = "state.json";

/// Resolve the operator's state directory: `explicit`, else `~/.caddy-operator`.
///
/// # Errors
///
/// Returns an error if no directory is given and the home directory cannot
/// be determined.
pub fn state_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.join(".caddy-operator"))
}

/// State file manager.
pub struct StateManager {
    path: PathBuf,
}

impl StateManager {
    /// State manager for `state.json` inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::with_path(dir.join(STATE_FILE))
    }

    /// Create a state manager with an explicit path (used in tests).
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_sync(path: &Path) -> Result<Option<OperatorState>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading state file {}", path.display()))?;
        let state = serde_json::from_str(&content)
            .with_context(|| format!("parsing state file {}", path.display()))?;
        Ok(Some(state))
    }

    fn save_sync(path: &Path, state: &OperatorState) -> Result<()> {
        let content = serde_json::to_vec_pretty(state).context("serializing state")?;
        write_atomic(path, &content, Some(0o600))
            .with_context(|| format!("saving state file {}", path.display()))
    }
}

impl OperatorStateStore for StateManager {
    async fn load_async(&self) -> Result<Option<OperatorState>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::load_sync(&path))
            .await
            .context("state load task panicked")?
    }

    async fn save_async(&self, state: &OperatorState) -> Result<()> {
        let path = self.path.clone();
        let state = state.clone();
        tokio::task::spawn_blocking(move || Self::save_sync(&path, &state))
            .await
            .context("state save task panicked")?
    }
}
