//! st budget - Inspect and change the unspent budget

use clap::{Args, Subcommand};
use console::style;
use serde::Serialize;

use crate::app::AppContext;
use crate::budget::LevelBudget;
use crate::cli::output::{emit_data, HumanLayout};
use crate::core::{Scope, ScopeState};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct BudgetArgs {
    #[command(subcommand)]
    pub command: Option<BudgetCommand>,
}

#[derive(Subcommand, Debug)]
pub enum BudgetCommand {
    /// Show the unspent budget (default)
    Show,
    /// Overwrite the unspent budget
    Set { points: u32 },
    /// Add points to the unspent budget
    Grant { points: u32 },
    /// Derive the unspent budget from a level: earned points minus invested
    Level {
        level: u32,
        /// Override `budget.points_per_level`
        #[arg(long)]
        points_per_level: Option<u32>,
        /// Override `budget.starting_points`
        #[arg(long)]
        starting_points: Option<u32>,
    },
}

#[derive(Debug, Serialize)]
pub struct BudgetReport {
    pub scope: Scope,
    pub available: u32,
    pub invested: u64,
    /// Points earned at the requested level, for `budget level`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earned: Option<u32>,
}

impl BudgetReport {
    fn from_state(state: &ScopeState, earned: Option<u32>) -> Self {
        Self {
            scope: state.scope().clone(),
            available: state.budget,
            invested: state.ledger.total_invested(),
            earned,
        }
    }
}

pub fn run(ctx: &AppContext, args: &BudgetArgs) -> Result<()> {
    let session = ctx.session();
    let report = match args.command.as_ref().unwrap_or(&BudgetCommand::Show) {
        BudgetCommand::Show => BudgetReport::from_state(&session.load(&ctx.scope)?, None),
        BudgetCommand::Set { points } => {
            BudgetReport::from_state(&session.set_budget(&ctx.scope, *points)?, None)
        }
        BudgetCommand::Grant { points } => {
            BudgetReport::from_state(&session.grant(&ctx.scope, *points)?, None)
        }
        BudgetCommand::Level {
            level,
            points_per_level,
            starting_points,
        } => {
            let defaults = LevelBudget::from_config(&ctx.config.budget);
            let source = LevelBudget::new(
                points_per_level.unwrap_or(defaults.points_per_level),
                starting_points.unwrap_or(defaults.starting_points),
            )
            .at_level(*level);
            let state = session.apply_budget_source(&ctx.scope, &source)?;
            BudgetReport::from_state(&state, Some(source.earned()))
        }
    };

    emit_data(ctx.output_format, &report, |report| {
        let mut layout = HumanLayout::new();
        layout
            .title(&format!("Budget: {}", report.scope))
            .kv("unspent", &style(report.available).bold().to_string())
            .kv("invested", &report.invested.to_string());
        if let Some(earned) = report.earned {
            layout.kv("earned", &earned.to_string());
        }
        layout
    })
}
