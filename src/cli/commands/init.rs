//! st init - Create the root directory, config and database

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use crate::app::{resolve_root, AppContext, LOCAL_ROOT_DIR};
use crate::cli::output::{emit_data, HumanLayout, OutputFormat};
use crate::cli::Cli;
use crate::config::Config;
use crate::error::Result;
use crate::storage::Database;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Initialize `./.skilltree` instead of the resolved root
    #[arg(long)]
    pub local: bool,

    /// Overwrite an existing config.toml with defaults
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
pub struct InitReport {
    pub root: PathBuf,
    pub config: PathBuf,
    pub config_written: bool,
    pub database: PathBuf,
    pub schema_version: u32,
}

/// Init runs before a context exists: opening one would create a database
/// at the resolved root even when `--local` points elsewhere.
pub fn run_without_context(cli: &Cli, args: &InitArgs) -> Result<()> {
    let target = target_root(args, None)?;
    let report = initialize(&target, args.force)?;
    render(cli.requested_format().unwrap_or_default(), &report)
}

pub fn run(ctx: &AppContext, args: &InitArgs) -> Result<()> {
    let target = target_root(args, Some(&ctx.st_root))?;
    let report = initialize(&target, args.force)?;
    render(ctx.output_format, &report)
}

fn target_root(args: &InitArgs, resolved: Option<&Path>) -> Result<PathBuf> {
    if args.local {
        return Ok(std::env::current_dir()?.join(LOCAL_ROOT_DIR));
    }
    match resolved {
        Some(root) => Ok(root.to_path_buf()),
        None => resolve_root(),
    }
}

/// Create `root`, write a default config unless one exists, and migrate the
/// database. Safe to run again on an initialized root.
pub fn initialize(root: &Path, force: bool) -> Result<InitReport> {
    fs::create_dir_all(root)?;
    fs::create_dir_all(root.join("locks"))?;

    let config_path = root.join("config.toml");
    let config_written = force || !config_path.exists();
    if config_written {
        fs::write(&config_path, Config::default().to_toml()?)?;
    }

    let config = Config::load(None, root)?;
    let database = config.db_path(root);
    let db = Database::open(&database)?;

    info!(root = %root.display(), config_written, "initialized");
    Ok(InitReport {
        root: root.to_path_buf(),
        config: config_path,
        config_written,
        database,
        schema_version: db.schema_version(),
    })
}

fn render(format: OutputFormat, report: &InitReport) -> Result<()> {
    emit_data(format, report, |report| {
        let mut layout = HumanLayout::new();
        layout
            .title(&format!("{} Initialized skilltree", style("✓").green()))
            .kv("root", &report.root.display().to_string())
            .kv("database", &report.database.display().to_string())
            .kv("schema", &report.schema_version.to_string());
        let config_note = if report.config_written {
            "written"
        } else {
            "kept (use --force to reset)"
        };
        layout.kv(
            "config",
            &format!("{} {}", report.config.display(), style(config_note).dim()),
        );
        layout
    })
}
