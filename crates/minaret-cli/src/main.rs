//! minaret CLI entry point.

use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use minaret_providers::ReconcilePolicy;

mod config;
mod run;

use config::Config;

/// Fetch today's prayer times and sync them onto Google Calendar.
#[derive(Parser, Debug)]
#[command(name = "minaret", version, about)]
struct Cli {
    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Override the SYNC_POLICY environment variable
    /// (clear, clear-all, skip-if-exists, append)
    #[arg(long)]
    policy: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.debug {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(ref policy) = cli.policy {
        config.policy = match ReconcilePolicy::from_str(policy) {
            Ok(policy) => policy,
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::FAILURE;
            }
        };
    }

    match run::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
