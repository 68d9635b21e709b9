//! `caddy-operator status`: show the last published unit status.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;

/// Run the status command.
///
/// # Errors
///
/// Returns an error if the status file is unreadable.
pub fn run(app: &AppContext) -> Result<ExitCode> {
    let record = app.status_file().load()?;
    app.renderer().render_status(record.as_ref())?;
    Ok(ExitCode::SUCCESS)
}
