//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },
}

// ── Render errors ─────────────────────────────────────────────────────────────

/// Template parse or resolution failure. Indicates a defect in the template
/// itself, never a transient condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unclosed tag at byte {0}")]
    Unclosed(usize),

    #[error("malformed tag '{0}'")]
    Malformed(String),

    #[error("unknown value '{0}'")]
    UnknownValue(String),

    #[error("unknown section flag '{0}'")]
    UnknownSection(String),

    #[error("'/if' at byte {0} has no matching '#if'")]
    UnmatchedEnd(usize),

    #[error("section '{0}' is never closed")]
    UnclosedSection(String),
}

/// Errors produced while rendering the workload configuration artifact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("invalid {field} '{value}': {reason}")]
    InvalidInput {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

// ── Gateway errors ────────────────────────────────────────────────────────────

/// Failures reported by the runtime backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The backend is not reachable yet. Always retried by redelivery.
    #[error("runtime backend unavailable: {0}")]
    Unavailable(String),

    #[error("cannot write {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("{operation} rejected by runtime backend: {reason}")]
    Operation { operation: String, reason: String },
}

impl GatewayError {
    /// Returns `true` for failures that resolve on their own once the
    /// backend becomes ready.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

// ── Reconcile errors ──────────────────────────────────────────────────────────

/// Non-retryable failure of a reconciliation pass.
///
/// Transient backend unreadiness never appears here; it is absorbed into a
/// deferred outcome.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("cannot load configuration: {0}")]
    Config(String),

    #[error("cannot render configuration: {0}")]
    Render(#[from] RenderError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("cannot access operator state: {0:#}")]
    State(anyhow::Error),
}

// ── Action errors ─────────────────────────────────────────────────────────────

/// Failure message returned by an on-demand action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ActionFailure(pub String);
