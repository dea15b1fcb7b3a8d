//! Application context shared by CLI commands.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::core::Scope;
use crate::error::{Result, StError};
use crate::service::ScopeSession;
use crate::storage::Database;

/// Name of a project-local root directory.
pub const LOCAL_ROOT_DIR: &str = ".skilltree";

pub struct AppContext {
    pub st_root: PathBuf,
    pub config_path: Option<PathBuf>,
    pub config: Config,
    pub db: Database,
    pub output_format: OutputFormat,
    pub scope: Scope,
    pub verbosity: u8,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("st_root", &self.st_root)
            .field("scope", &self.scope)
            .field("output_format", &self.output_format)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let st_root = resolve_root()?;
        let config = Config::load(cli.config.as_deref(), &st_root)?;
        let scope = parse_scope(&cli.scope)?;
        let output_format = cli
            .requested_format()
            .unwrap_or_else(|| OutputFormat::from_config(&config.output.format));

        if !config.output.color || !output_format.use_colors() {
            console::set_colors_enabled(false);
        }

        let db = Database::open(config.db_path(&st_root))?;
        debug!(root = %st_root.display(), scope = %scope, "context ready");

        Ok(Self {
            st_root,
            config_path: cli.config.clone(),
            config,
            db,
            output_format,
            scope,
            verbosity: cli.verbose,
        })
    }

    /// Session bound to this context's database, root and lock timeout.
    pub fn session(&self) -> ScopeSession<'_> {
        ScopeSession::new(
            &self.db,
            &self.st_root,
            Duration::from_millis(self.config.storage.lock_timeout_ms),
        )
    }
}

pub fn parse_scope(raw: &str) -> Result<Scope> {
    raw.parse::<Scope>().map_err(StError::ValidationFailed)
}

/// Root directory: `ST_ROOT`, else the nearest `.skilltree/` above the
/// working directory, else the platform data dir.
pub fn resolve_root() -> Result<PathBuf> {
    if let Ok(root) = std::env::var("ST_ROOT") {
        if !root.trim().is_empty() {
            return Ok(PathBuf::from(root));
        }
    }
    let cwd = std::env::current_dir()?;
    if let Some(found) = find_local_root(&cwd) {
        return Ok(found);
    }
    global_root()
}

pub fn global_root() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("skilltree"))
        .ok_or_else(|| StError::MissingConfig("data directory not found".to_string()))
}

/// Walk up from `start` looking for a `.skilltree` directory.
pub fn find_local_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(LOCAL_ROOT_DIR))
        .find(|candidate| candidate.is_dir())
}
