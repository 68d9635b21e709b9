//! caddy-operator: reconcile a Caddy workload running under Pebble

use std::process::ExitCode;

use caddy_operator::cli::Cli;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr so stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "caddy_operator=debug"
    } else {
        "caddy_operator=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
