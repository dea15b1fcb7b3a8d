//! st edge - Author prerequisite edges

use clap::{Args, Subcommand};
use console::style;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{emit_data, HumanLayout};
use crate::core::SkillEdge;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct EdgeArgs {
    #[command(subcommand)]
    pub command: EdgeCommand,
}

#[derive(Subcommand, Debug)]
pub enum EdgeCommand {
    /// Require points in PARENT before CHILD unlocks
    Link {
        parent: String,
        child: String,
        /// Points the parent needs before the child unlocks
        #[arg(long, default_value_t = 1)]
        min: u32,
    },
    /// Remove the prerequisite between PARENT and CHILD
    Unlink { parent: String, child: String },
}

#[derive(Debug, Serialize)]
pub struct EdgeReport {
    pub action: &'static str,
    pub edge: SkillEdge,
    pub edges: usize,
}

pub fn run(ctx: &AppContext, args: &EdgeArgs) -> Result<()> {
    let session = ctx.session();
    let report = match &args.command {
        EdgeCommand::Link { parent, child, min } => {
            let edge = SkillEdge::new(parent, child, *min);
            let state = session.author(&ctx.scope, "edge link", |state| {
                state.add_edge(edge.clone())
            })?;
            EdgeReport {
                action: "linked",
                edge,
                edges: state.graph.edges().len(),
            }
        }
        EdgeCommand::Unlink { parent, child } => {
            let before = session.load(&ctx.scope)?;
            let edge = before
                .graph
                .edge(parent, child)
                .cloned()
                .unwrap_or_else(|| SkillEdge::new(parent, child, 1));
            let state = session.author(&ctx.scope, "edge unlink", |state| {
                state.delete_edge(parent, child)
            })?;
            EdgeReport {
                action: "unlinked",
                edge,
                edges: state.graph.edges().len(),
            }
        }
    };

    emit_data(ctx.output_format, &report, |report| {
        let mut layout = HumanLayout::new();
        layout
            .title(&format!(
                "{} {} {} -> {}",
                style("✓").green(),
                report.action,
                report.edge.parent_id,
                report.edge.child_id
            ))
            .kv("min investment", &report.edge.min_investment.to_string())
            .kv("edges in scope", &report.edges.to_string());
        layout
    })
}
