//! st effects - Aggregated effects of the scope

use clap::Args;
use console::style;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{emit_data, HumanLayout};
use crate::core::{CombineRule, EffectTotals, Scope};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct EffectsArgs {}

#[derive(Debug, Serialize)]
pub struct EffectsReport {
    pub scope: Scope,
    pub effects: EffectTotals,
    /// `xp_multiplier` as a factor to apply to earned XP.
    pub xp_factor: f64,
}

pub fn run(ctx: &AppContext, _args: &EffectsArgs) -> Result<()> {
    let state = ctx.session().load(&ctx.scope)?;
    let effects = state.effects();
    let report = EffectsReport {
        scope: ctx.scope.clone(),
        xp_factor: effects.xp_factor(),
        effects,
    };

    emit_data(ctx.output_format, &report, |report| {
        let mut layout = HumanLayout::new();
        layout.title(&format!("Effects: {}", report.scope));
        if report.effects.is_empty() {
            layout.push_line(style("No active effects.").dim().to_string());
            return layout;
        }
        for entry in report.effects.entries() {
            let value = if entry.rule == CombineRule::Flag {
                style("active").green().to_string()
            } else {
                entry.value.to_string()
            };
            layout.kv(&entry.kind.to_string(), &value);
        }
        layout
            .blank()
            .kv("xp factor", &format!("x{:.2}", report.xp_factor));
        layout
    })
}
