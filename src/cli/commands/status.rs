//! st status - Availability and investment of every node

use clap::Args;
use console::style;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{emit_data, HumanLayout};
use crate::core::{NodeStatus, Scope};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Only list nodes that can take another point now
    #[arg(long)]
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub scope: Scope,
    pub budget: u32,
    pub invested: u64,
    pub nodes: Vec<NodeStatus>,
}

pub fn run(ctx: &AppContext, args: &StatusArgs) -> Result<()> {
    let state = ctx.session().load(&ctx.scope)?;
    let mut nodes = state.status();
    if args.available {
        nodes.retain(|node| node.is_available && !node.is_maxed);
    }
    let report = StatusReport {
        scope: ctx.scope.clone(),
        budget: state.budget,
        invested: state.ledger.total_invested(),
        nodes,
    };

    emit_data(ctx.output_format, &report, |report| {
        let mut layout = HumanLayout::new();
        layout
            .title(&format!("Skill tree: {}", report.scope))
            .kv("unspent", &report.budget.to_string())
            .kv("invested", &report.invested.to_string())
            .blank();
        for node in &report.nodes {
            let marker = if node.is_maxed {
                style("★").yellow()
            } else if node.is_available {
                style("●").green()
            } else {
                style("○").dim()
            };
            layout.push_line(format!(
                "{marker} {:<24} {}/{}",
                node.node_id, node.current_investment, node.max_investment
            ));
        }
        if report.nodes.is_empty() {
            layout.push_line(style("No nodes to show.").dim().to_string());
        }
        layout
    })
}
