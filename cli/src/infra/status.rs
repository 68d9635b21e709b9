//! File-backed `StatusSink`: the last published status as JSON.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::StatusSink;
use crate::domain::status::StatusRecord;
use crate::domain::UnitStatus;
use crate::infra::fs::write_atomic;

pub const STATUS_FILE: &str = "status.json";

pub struct StatusFile {
    path: PathBuf,
}

impl StatusFile {
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(STATUS_FILE),
        }
    }

    /// Last published status, or `None` if nothing was published yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Option<StatusRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading status file {}", self.path.display()))?;
        let record = serde_json::from_str(&content)
            .with_context(|| format!("parsing status file {}", self.path.display()))?;
        Ok(Some(record))
    }
}

impl StatusSink for StatusFile {
    async fn publish(&self, status: &UnitStatus) -> Result<()> {
        let record = StatusRecord::now(status.clone());
        let content = serde_json::to_vec_pretty(&record).context("serializing status")?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&path, &content, None))
            .await
            .context("status write task panicked")?
    }
}
