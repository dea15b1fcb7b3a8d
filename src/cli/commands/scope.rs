//! st scope - List stored scopes, export and import snapshots

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde::Serialize;
use tracing::info;

use crate::app::{parse_scope, AppContext};
use crate::cli::output::{emit_data, HumanLayout};
use crate::core::Scope;
use crate::error::Result;
use crate::storage::{ScopeSnapshot, SnapshotFormat};

#[derive(Args, Debug)]
pub struct ScopeArgs {
    #[command(subcommand)]
    pub command: ScopeCommand,
}

#[derive(Subcommand, Debug)]
pub enum ScopeCommand {
    /// List every scope with stored data
    List,
    /// Write the current scope as a snapshot
    Export {
        /// Destination file; prints to stdout when omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// json or yaml (default: from the file extension, else json)
        #[arg(long, short)]
        format: Option<String>,
    },
    /// Replace a scope with the contents of a snapshot
    Import {
        path: PathBuf,
        /// json or yaml (default: from the file extension)
        #[arg(long, short)]
        format: Option<String>,
        /// Import into this scope instead of the one recorded in the file
        #[arg(long)]
        into: Option<String>,
    },
}

#[derive(Debug, Serialize)]
pub struct TransferReport {
    pub scope: Scope,
    pub path: PathBuf,
    pub nodes: usize,
    pub edges: usize,
    pub invested: u64,
    pub budget: u32,
}

pub fn run(ctx: &AppContext, args: &ScopeArgs) -> Result<()> {
    match &args.command {
        ScopeCommand::List => run_list(ctx),
        ScopeCommand::Export { output, format } => {
            run_export(ctx, output.as_deref(), format.as_deref())
        }
        ScopeCommand::Import { path, format, into } => {
            run_import(ctx, path, format.as_deref(), into.as_deref())
        }
    }
}

fn snapshot_format(explicit: Option<&str>, path: Option<&Path>) -> Result<SnapshotFormat> {
    match (explicit, path) {
        (Some(raw), _) => raw.parse(),
        (None, Some(path)) => Ok(SnapshotFormat::from_path(path)),
        (None, None) => Ok(SnapshotFormat::Json),
    }
}

fn run_list(ctx: &AppContext) -> Result<()> {
    let scopes = ctx.db.list_scopes()?;
    emit_data(ctx.output_format, &scopes, |scopes| {
        let mut layout = HumanLayout::new();
        layout.title("Scopes");
        if scopes.is_empty() {
            layout.push_line(style("No scopes stored yet.").dim().to_string());
        }
        for summary in scopes {
            let budget = summary
                .budget
                .map_or_else(|| "-".to_string(), |budget| budget.to_string());
            layout.bullet(&format!(
                "{} nodes {} invested {} unspent {}",
                style(&summary.scope).cyan(),
                summary.nodes,
                summary.invested,
                budget
            ));
        }
        layout
    })
}

fn run_export(ctx: &AppContext, output: Option<&Path>, format: Option<&str>) -> Result<()> {
    let format = snapshot_format(format, output)?;
    let state = ctx.session().load(&ctx.scope)?;
    let snapshot = ScopeSnapshot::from_state(&state);

    let Some(path) = output else {
        // The snapshot itself is the output; no envelope.
        println!("{}", snapshot.render(format)?.trim_end());
        return Ok(());
    };

    snapshot.write_to(path, format)?;
    info!(scope = %ctx.scope, path = %path.display(), "scope exported");
    let report = TransferReport {
        scope: ctx.scope.clone(),
        path: path.to_path_buf(),
        nodes: snapshot.nodes.len(),
        edges: snapshot.edges.len(),
        invested: state.ledger.total_invested(),
        budget: snapshot.budget,
    };
    render_transfer(ctx, &report, "Exported")
}

fn run_import(
    ctx: &AppContext,
    path: &Path,
    format: Option<&str>,
    into: Option<&str>,
) -> Result<()> {
    let format = snapshot_format(format, Some(path))?;
    let target = into.map(parse_scope).transpose()?;
    let snapshot = ScopeSnapshot::read_from(path, format)?;
    let state = snapshot.into_state(target.as_ref())?;
    let state = ctx.session().replace(state)?;
    info!(scope = %state.scope(), path = %path.display(), "scope imported");

    let report = TransferReport {
        scope: state.scope().clone(),
        path: path.to_path_buf(),
        nodes: state.graph.node_count(),
        edges: state.graph.edges().len(),
        invested: state.ledger.total_invested(),
        budget: state.budget,
    };
    render_transfer(ctx, &report, "Imported")
}

fn render_transfer(ctx: &AppContext, report: &TransferReport, verb: &str) -> Result<()> {
    emit_data(ctx.output_format, report, |report| {
        let mut layout = HumanLayout::new();
        layout
            .title(&format!(
                "{} {verb} {} ({})",
                style("✓").green(),
                report.scope,
                report.path.display()
            ))
            .kv("nodes", &report.nodes.to_string())
            .kv("edges", &report.edges.to_string())
            .kv("invested", &report.invested.to_string())
            .kv("unspent", &report.budget.to_string());
        layout
    })
}
