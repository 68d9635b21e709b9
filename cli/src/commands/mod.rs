//! Command implementations

pub mod action;
pub mod history;
pub mod plan;
pub mod reconcile;
pub mod render;
pub mod status;
pub mod version;
