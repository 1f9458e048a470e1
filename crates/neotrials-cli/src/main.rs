//! Neotrials CLI - Main entry point

use clap::Parser;
use neotrials_cli::{Cli, Commands};
use neotrials_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Handle markdown help generation
    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    // Ensure a command is provided
    if cli.command.is_none() {
        eprintln!("Error: A subcommand is required");
        eprintln!();
        eprintln!("For more information, try '--help'.");
        process::exit(2);
    }

    // Initialize logging based on verbose flag and environment. An explicit
    // --verbose beats LOG_LEVEL; otherwise default to warnings-only so the
    // console stays clean around the exported rows.
    let mut log_config = LogConfig::from_env().unwrap_or_default();
    if cli.verbose {
        log_config.level = LogLevel::Debug;
        log_config.output = LogOutput::Console;
    } else if std::env::var("LOG_LEVEL").is_err() {
        log_config.level = LogLevel::Warn;
    }

    // Initialize logging (ignore errors as CLI should work without logging)
    let _ = init_logging(&log_config);

    // Execute command
    let result = execute_command(cli).await;

    // Handle result
    if let Err(e) = result {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: Cli) -> neotrials_cli::Result<()> {
    // Command is guaranteed to exist at this point (checked in main)
    let Some(command) = cli.command else {
        unreachable!("Command should have been validated in main");
    };

    match command {
        Commands::Records { fetch, window, out } => {
            neotrials_cli::commands::records::run(fetch, window, out).await
        }

        Commands::Summary { fetch, window, out } => {
            neotrials_cli::commands::summary::run(fetch, window, out).await
        }
    }
}
