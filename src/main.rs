//! Locus CLI - geographic hierarchy browser and coverage-area resolver
//!
//! Usage: locus <COMMAND>
//!
//! Commands:
//!   tree          Print the hierarchy with selection state
//!   suggest       Find the tightest coverage area for a selection
//!   check-delete  Check whether a location or coverage area can be deleted
//!   search        Search locations by name or code

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use locus::config::Verbosity;

mod cli;
mod commands;
mod ui;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let (config, warnings) = commands::load_config(&cli)?;
    init_logging(cli.verbose, config.output.verbosity);

    let unicode = config.output.unicode && !cli.ascii;
    for warning in &warnings {
        ui::report::print_config_warning(warning, unicode);
    }

    let engine = commands::open_engine(&cli, &config)?;

    match cli.command {
        Commands::Tree {
            expand,
            select,
            subtree,
            inactive,
        } => {
            let options = commands::tree::TreeOptions {
                expand,
                subtree,
                include_inactive: inactive,
                json: cli.json,
                unicode,
            };
            commands::tree::run(&engine, &config.expansion, &select, options).await
        }
        Commands::Suggest { select, all } => {
            commands::suggest::run(&engine, &select, all, cli.json).await
        }
        Commands::CheckDelete { target } => {
            commands::check_delete::run(&engine, target, cli.json, unicode).await
        }
        Commands::Search { term } => commands::search::run(&engine, &term, cli.json).await,
    }
}

/// `RUST_LOG` wins; otherwise `-v` flags, otherwise the configured verbosity
fn init_logging(verbose: u8, configured: Verbosity) {
    let directive = match verbose {
        0 => configured.log_directive(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
