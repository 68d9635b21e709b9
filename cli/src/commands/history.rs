//! `caddy-operator history`: list every hostname the operator has seen.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::history::HistoryTracker;

/// Run the history command.
///
/// # Errors
///
/// Returns an error if the state file is unreadable.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let store = app.state_store();
    let entries = HistoryTracker::new(&store).entries().await?;
    app.renderer().render_history(&entries)?;
    Ok(ExitCode::SUCCESS)
}
