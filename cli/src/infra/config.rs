//! Infrastructure implementation of the `ConfigSource` port.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::ConfigSource;
use crate::domain::DesiredConfig;

/// Resolve the workload config path: `explicit`, else `~/.caddy-operator/config.yaml`.
///
/// `CADDY_OPERATOR_CONFIG` is folded into `explicit` by the CLI parser.
///
/// # Errors
///
/// Returns an error if no path is given and the home directory cannot be
/// determined.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.join(".caddy-operator").join("config.yaml"))
}

/// Workload configuration read from a YAML key/value file on disk.
pub struct YamlConfigSource {
    path: PathBuf,
}

impl YamlConfigSource {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_sync(path: &Path) -> Result<DesiredConfig> {
        if !path.exists() {
            return Ok(DesiredConfig::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(DesiredConfig::default());
        }
        let values: BTreeMap<String, serde_yaml::Value> = serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", path.display()))?;
        DesiredConfig::from_values(&values)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }
}

impl ConfigSource for YamlConfigSource {
    async fn desired(&self) -> Result<DesiredConfig> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::load_sync(&path))
            .await
            .context("config load task panicked")?
    }
}
