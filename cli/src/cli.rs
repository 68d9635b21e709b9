//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;

/// Reconcile a Caddy workload running under Pebble
#[derive(Parser)]
#[command(
    name = "caddy-operator",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output (the `NO_COLOR` environment variable also works)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log debug details to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Workload configuration file [default: ~/.caddy-operator/config.yaml]
    #[arg(long, global = true, env = "CADDY_OPERATOR_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one reconciliation pass for an event
    Reconcile(commands::reconcile::ReconcileArgs),

    /// Show the last published status
    Status,

    /// List every hostname seen so far
    History,

    /// Run an on-demand action
    #[command(subcommand)]
    Action(commands::action::ActionCommand),

    /// Print the desired Pebble layer
    Plan,

    /// Print the rendered Caddyfile
    Render,

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the context cannot be built or the command fails
    /// outside its own reporting.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            verbose: _,
            config,
            command,
        } = self;
        let app = AppContext::new(&AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            config,
        })?;

        match command {
            Command::Reconcile(args) => commands::reconcile::run(&app, &args).await,
            Command::Status => commands::status::run(&app),
            Command::History => commands::history::run(&app).await,
            Command::Action(cmd) => commands::action::run(&app, &cmd).await,
            Command::Plan => commands::plan::run(&app).await,
            Command::Render => commands::render::run(&app).await,
            Command::Version => commands::version::run(&app),
        }
    }
}
