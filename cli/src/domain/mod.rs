//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod fortune;
pub mod history;
pub mod plan;
pub mod reconcile;
pub mod render;
pub mod state;
pub mod status;

pub use config::DesiredConfig;
pub use error::{ConfigError, GatewayError, ReconcileError, RenderError, TemplateError};
pub use history::History;
pub use reconcile::{Action, Phase, ReconcileOutcome, Trigger};
pub use state::OperatorState;
pub use status::{StatusKind, StatusRecord, UnitStatus};
