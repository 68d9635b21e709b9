//! `caddy-operator render`: print the Caddyfile without touching Pebble.

use std::process::ExitCode;

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::ports::ConfigSource;
use crate::domain::render::{artifact_digest, render_with};

/// Run the render command.
///
/// # Errors
///
/// Returns an error if the configuration, template, or hostname is invalid.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let cfg = app.config_source().desired().await?;
    let template = app.template()?;
    let content = render_with(&template, &cfg).context("cannot render Caddyfile")?;
    app.renderer()
        .render_artifact(&String::from_utf8_lossy(&content), &artifact_digest(&content))?;
    Ok(ExitCode::SUCCESS)
}
