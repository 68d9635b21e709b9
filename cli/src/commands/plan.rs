//! `caddy-operator plan`: print the desired layer without touching Pebble.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::ConfigSource;
use crate::domain::plan::{build_plan, layer};

/// Run the plan command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let cfg = app.config_source().desired().await?;
    app.renderer().render_plan(&layer(&build_plan(&cfg)))?;
    Ok(ExitCode::SUCCESS)
}
