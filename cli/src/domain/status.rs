//! Externally reported unit status.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::reconcile::{Phase, ReconcileOutcome};

pub const WAITING_FOR_PEBBLE: &str = "waiting for Pebble in workload container";
pub const APPLYING: &str = "applying caddy configuration";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Active,
    Waiting,
    Maintenance,
    Error,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Waiting => "waiting",
            Self::Maintenance => "maintenance",
            Self::Error => "error",
        })
    }
}

/// One of four externally visible states, with an optional message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStatus {
    #[serde(rename = "status")]
    pub kind: StatusKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UnitStatus {
    #[must_use]
    pub fn active() -> Self {
        Self {
            kind: StatusKind::Active,
            message: None,
        }
    }

    #[must_use]
    pub fn waiting(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Waiting,
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn maintenance(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Maintenance,
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: Some(message.into()),
        }
    }

    /// Map a finished pass to its status.
    ///
    /// Deferred passes always report the fixed Pebble waiting message; the
    /// underlying cause goes to the log instead.
    #[must_use]
    pub fn from_outcome(outcome: &ReconcileOutcome) -> Self {
        match outcome.phase {
            Phase::Deferred => Self::waiting(WAITING_FOR_PEBBLE),
            Phase::Failed => Self::error(outcome.reason.clone().unwrap_or_default()),
            Phase::Converged => Self::active(),
            Phase::Pending | Phase::Connecting | Phase::Diffing | Phase::Applying => {
                Self::maintenance(APPLYING)
            }
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.kind != StatusKind::Maintenance
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(m) if !m.is_empty() => write!(f, "{}: {m}", self.kind),
            _ => write!(f, "{}", self.kind),
        }
    }
}

/// A published status with its publication time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    #[serde(flatten)]
    pub status: UnitStatus,
    pub updated_at: DateTime<Utc>,
}

impl StatusRecord {
    #[must_use]
    pub fn now(status: UnitStatus) -> Self {
        Self {
            status,
            updated_at: Utc::now(),
        }
    }
}
