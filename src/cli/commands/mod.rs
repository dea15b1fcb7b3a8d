//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;

pub mod budget;
pub mod edge;
pub mod effects;
pub mod history;
pub mod init;
pub mod invest;
pub mod node;
pub mod scope;
pub mod status;

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Init(args) => init::run(ctx, args),
        Commands::Node(args) => node::run(ctx, args),
        Commands::Edge(args) => edge::run(ctx, args),
        Commands::Invest(args) => invest::run_invest(ctx, args),
        Commands::Refund(args) => invest::run_refund(ctx, args),
        Commands::Status(args) => status::run(ctx, args),
        Commands::Effects(args) => effects::run(ctx, args),
        Commands::Budget(args) => budget::run(ctx, args),
        Commands::History(args) => history::run(ctx, args),
        Commands::Scope(args) => scope::run(ctx, args),
    }
}
