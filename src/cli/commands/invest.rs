//! st invest / st refund - Move one point between the budget and a node

use clap::Args;
use console::style;

use crate::app::AppContext;
use crate::cli::output::{emit_data, HumanLayout};
use crate::error::Result;
use crate::service::TransactionOutcome;

#[derive(Args, Debug)]
pub struct InvestArgs {
    /// Node to invest in
    pub node_id: String,
}

#[derive(Args, Debug)]
pub struct RefundArgs {
    /// Node to refund from
    pub node_id: String,
}

pub fn run_invest(ctx: &AppContext, args: &InvestArgs) -> Result<()> {
    let outcome = ctx.session().invest(&ctx.scope, &args.node_id)?;
    render(ctx, &outcome, "Invested in")
}

pub fn run_refund(ctx: &AppContext, args: &RefundArgs) -> Result<()> {
    let outcome = ctx.session().refund(&ctx.scope, &args.node_id)?;
    render(ctx, &outcome, "Refunded from")
}

fn render(ctx: &AppContext, outcome: &TransactionOutcome, verb: &str) -> Result<()> {
    emit_data(ctx.output_format, outcome, |outcome| {
        let mut layout = HumanLayout::new();
        layout
            .title(&format!(
                "{} {verb} {}",
                style("✓").green(),
                style(&outcome.node_id).cyan()
            ))
            .kv("points", &outcome.points.to_string())
            .kv("unspent", &outcome.budget.to_string())
            .kv("scope", &outcome.scope.to_string());
        layout
    })
}
