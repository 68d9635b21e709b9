//! Persisted operator state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::history::History;

/// Everything the operator remembers between invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorState {
    /// Every hostname ever configured, first-seen order.
    #[serde(default)]
    pub hostnames: History,
    /// Digest of the last artifact written to the workload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_sha256: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Default for OperatorState {
    fn default() -> Self {
        Self {
            hostnames: History::default(),
            artifact_sha256: None,
            updated_at: Utc::now(),
        }
    }
}

impl OperatorState {
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
