//! `caddy-operator action`: on-demand queries.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::services::actions;
use crate::domain::error::ActionFailure;
use crate::infra::assets::{self, FORTUNES};

#[derive(Subcommand)]
pub enum ActionCommand {
    /// Report the configured hostname and every previous one
    Hostname,
    /// Print a random fortune
    Fortune {
        /// Fix the selection (for reproducible output)
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Run an action. A failed action prints its message and exits 1.
///
/// # Errors
///
/// Returns an error if output fails.
pub async fn run(app: &AppContext, cmd: &ActionCommand) -> Result<ExitCode> {
    let renderer = app.renderer();
    let rendered = match cmd {
        ActionCommand::Hostname => actions::hostname(&app.config_source(), &app.state_store())
            .await
            .map(|report| renderer.render_hostname(&report)),
        ActionCommand::Fortune { seed } => {
            actions::fortune(assets::get_text(FORTUNES)?, *seed)
                .map(|report| renderer.render_fortune(&report))
        }
    };
    match rendered {
        Ok(output) => {
            output?;
            Ok(ExitCode::SUCCESS)
        }
        Err(ActionFailure(message)) => {
            renderer.render_failure(&message, "action_failed")?;
            Ok(ExitCode::FAILURE)
        }
    }
}
