//! st history - Accepted invests and refunds, newest first

use clap::Args;
use console::style;

use crate::app::AppContext;
use crate::cli::output::{emit_data, HumanLayout};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Maximum number of events to show
    #[arg(long, short = 'n', default_value_t = 20)]
    pub limit: usize,
}

pub fn run(ctx: &AppContext, args: &HistoryArgs) -> Result<()> {
    let events = ctx.db.list_events(&ctx.scope, args.limit)?;

    emit_data(ctx.output_format, &events, |events| {
        let mut layout = HumanLayout::new();
        layout.title(&format!("History: {}", ctx.scope));
        if events.is_empty() {
            layout.push_line(style("No investments recorded.").dim().to_string());
        }
        for event in events {
            let delta = if event.delta > 0 {
                style(format!("+{}", event.delta)).green()
            } else {
                style(event.delta.to_string()).red()
            };
            layout.push_line(format!(
                "{} {delta} {:<24} unspent {}",
                style(&event.created_at).dim(),
                event.node_id,
                event.budget_after
            ));
        }
        layout
    })
}
