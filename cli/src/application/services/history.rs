//! Application service: hostname history.
//!
//! History is observational only. Recording never triggers a pass.

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::ports::OperatorStateStore;

/// Records every hostname the operator has been configured with.
pub struct HistoryTracker<'a, S> {
    store: &'a S,
}

impl<'a, S: OperatorStateStore> HistoryTracker<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Append `hostname` if unseen. Returns `true` when newly added.
    ///
    /// # Errors
    ///
    /// Returns an error if the state store cannot be read or written.
    pub async fn record(&self, hostname: &str) -> Result<bool> {
        let mut state = self
            .store
            .load_async()
            .await
            .context("loading operator state")?
            .unwrap_or_default();
        if !state.hostnames.record(hostname) {
            return Ok(false);
        }
        debug!(hostname, "found a new hostname");
        state.touch();
        self.store
            .save_async(&state)
            .await
            .context("saving operator state")?;
        Ok(true)
    }

    /// # Errors
    ///
    /// Returns an error if the state store cannot be read.
    pub async fn contains(&self, hostname: &str) -> Result<bool> {
        Ok(self
            .store
            .load_async()
            .await?
            .is_some_and(|s| s.hostnames.contains(hostname)))
    }

    /// All recorded hostnames, first-seen order.
    ///
    /// # Errors
    ///
    /// Returns an error if the state store cannot be read.
    pub async fn entries(&self) -> Result<Vec<String>> {
        Ok(self
            .store
            .load_async()
            .await?
            .map(|s| s.hostnames.to_vec())
            .unwrap_or_default())
    }
}
