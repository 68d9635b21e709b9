//! Reconciliation vocabulary: triggers, phases, actions and outcomes.

use std::fmt;

use serde::Serialize;

use crate::domain::status::UnitStatus;

/// External events that start a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Trigger {
    /// The workload configuration was edited.
    ConfigChanged,
    /// The workload container's service manager became reachable.
    WorkloadReady,
    /// Periodic status refresh.
    UpdateStatus,
}

impl Trigger {
    /// Whether this trigger carries a configuration edit that must be
    /// recorded and announced before reconciling.
    #[must_use]
    pub fn is_config_change(self) -> bool {
        matches!(self, Self::ConfigChanged)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ConfigChanged => "config-changed",
            Self::WorkloadReady => "workload-ready",
            Self::UpdateStatus => "update-status",
        })
    }
}

/// Pass lifecycle: `Pending → Connecting → Diffing → Applying → Converged`,
/// leaving early through `Deferred` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Pending,
    Connecting,
    Diffing,
    Applying,
    Converged,
    Deferred,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Connecting => "connecting",
            Self::Diffing => "diffing",
            Self::Applying => "applying",
            Self::Converged => "converged",
            Self::Deferred => "deferred",
            Self::Failed => "failed",
        })
    }
}

/// Lifecycle transition taken by a pass. At most one per pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    None,
    Start,
    Restart,
    Deferred,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Start => "start",
            Self::Restart => "restart",
            Self::Deferred => "deferred",
        })
    }
}

/// Result of one reconciliation pass. Computed, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    /// Terminal phase: converged, deferred or failed.
    pub phase: Phase,
    /// Last phase entered before the pass ended.
    pub reached: Phase,
    pub action: Action,
    pub plan_changed: bool,
    pub artifact_changed: bool,
    /// Human-readable cause for deferred and failed passes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ReconcileOutcome {
    /// Backend was not ready. Nothing was mutated.
    #[must_use]
    pub fn deferred(reason: impl Into<String>, reached: Phase) -> Self {
        Self {
            phase: Phase::Deferred,
            reached,
            action: Action::Deferred,
            plan_changed: false,
            artifact_changed: false,
            reason: Some(reason.into()),
        }
    }

    /// Non-retryable failure.
    #[must_use]
    pub fn failed(reason: impl Into<String>, reached: Phase) -> Self {
        Self {
            phase: Phase::Failed,
            reached,
            action: Action::None,
            plan_changed: false,
            artifact_changed: false,
            reason: Some(reason.into()),
        }
    }

    /// Desired and observed state already matched.
    #[must_use]
    pub fn converged() -> Self {
        Self {
            phase: Phase::Converged,
            reached: Phase::Diffing,
            action: Action::None,
            plan_changed: false,
            artifact_changed: false,
            reason: None,
        }
    }

    /// Changes were applied and the service transitioned once.
    #[must_use]
    pub fn applied(action: Action, plan_changed: bool, artifact_changed: bool) -> Self {
        Self {
            phase: Phase::Converged,
            reached: Phase::Applying,
            action,
            plan_changed,
            artifact_changed,
            reason: None,
        }
    }

    #[must_use]
    pub fn is_deferred(&self) -> bool {
        self.phase == Phase::Deferred
    }

    /// Externally visible status for this outcome.
    #[must_use]
    pub fn status(&self) -> UnitStatus {
        UnitStatus::from_outcome(self)
    }
}
