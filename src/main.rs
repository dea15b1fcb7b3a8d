//! st - Skill progression graphs
//!
//! Author prerequisite trees, invest points, and read aggregated effects.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use skilltree::app::AppContext;
use skilltree::cli::output::emit_error;
use skilltree::cli::{Cli, Commands};
use skilltree::Result;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            emit_error(cli.requested_format().unwrap_or_default(), &e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if let Commands::Init(args) = &cli.command {
        return skilltree::cli::commands::init::run_without_context(cli, args);
    }
    let ctx = AppContext::from_cli(cli)?;
    skilltree::cli::commands::run(&ctx, &cli.command)
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,skilltree=info",
        1 => "info,skilltree=debug",
        2 => "debug,skilltree=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.is_machine() {
        // JSON logging for machine output
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
