//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use output::OutputFormat;

pub mod commands;
pub mod output;

/// Skill progression graphs: author prerequisite trees, invest points,
/// read aggregated effects
#[derive(Parser, Debug)]
#[command(name = "st")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (human, json, yaml, plain)
    #[arg(long, short = 'O', global = true, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Enable machine-readable JSON output (shorthand for --output-format=json)
    #[arg(long, short = 'm', global = true)]
    pub machine: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: <root>/config.toml over ~/.config/skilltree/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Scope to operate on: `global` or `category:<id>`
    #[arg(long, short = 's', global = true, default_value = "global")]
    pub scope: String,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Output format requested on the command line, if any.
    ///
    /// `--output-format` beats `--machine`; without either the config decides.
    #[must_use]
    pub fn requested_format(&self) -> Option<OutputFormat> {
        if let Some(fmt) = self.output_format {
            return Some(fmt);
        }
        if self.machine {
            return Some(OutputFormat::Json);
        }
        None
    }

    /// Whether machine output is requested before any config is read.
    #[must_use]
    pub fn is_machine(&self) -> bool {
        self.requested_format()
            .is_some_and(|fmt| fmt.is_machine_readable())
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the root directory, config, and database
    Init(commands::init::InitArgs),

    /// Author skill nodes
    Node(commands::node::NodeArgs),

    /// Author prerequisite edges
    Edge(commands::edge::EdgeArgs),

    /// Invest one point into a node
    Invest(commands::invest::InvestArgs),

    /// Refund one point from a node
    Refund(commands::invest::RefundArgs),

    /// Show availability and investment of every node
    Status(commands::status::StatusArgs),

    /// Show aggregated effects of the scope
    Effects(commands::effects::EffectsArgs),

    /// Inspect and change the unspent budget
    Budget(commands::budget::BudgetArgs),

    /// Show the investment history
    History(commands::history::HistoryArgs),

    /// List, export, and import scopes
    Scope(commands::scope::ScopeArgs),
}
