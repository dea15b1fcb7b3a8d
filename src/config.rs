use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path (or `ST_CONFIG`) replaces the global/project layers;
    /// otherwise the global file is applied first and the project file on top.
    /// `ST_*` environment variables always win.
    pub fn load(explicit_path: Option<&Path>, st_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("ST_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(st_root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Path of the global config file, if the platform has a config dir.
    #[must_use]
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("skilltree/config.toml"))
    }

    /// Resolve the database file against the root directory.
    #[must_use]
    pub fn db_path(&self, st_root: &Path) -> PathBuf {
        let file = PathBuf::from(&self.storage.db_file);
        if file.is_absolute() {
            file
        } else {
            st_root.join(file)
        }
    }

    /// Render as TOML, used by `st init` to seed a project config.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|err| StError::Config(format!("render config: {err}")))
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        match Self::global_path() {
            Some(path) => Self::load_patch(&path),
            None => Ok(None),
        }
    }

    fn load_project(st_root: &Path) -> Result<Option<ConfigPatch>> {
        let path = st_root.join("config.toml");
        Self::load_patch(&path)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| StError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| StError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.storage {
            self.storage.merge(patch);
        }
        if let Some(patch) = patch.budget {
            self.budget.merge(patch);
        }
        if let Some(patch) = patch.output {
            self.output.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if env_bool("ST_MACHINE").unwrap_or(false) {
            self.output.format = "json".to_string();
        }

        if let Some(value) = env_string("ST_DB_FILE") {
            self.storage.db_file = value;
        }
        if let Some(value) = env_u64("ST_LOCK_TIMEOUT_MS")? {
            self.storage.lock_timeout_ms = value;
        }

        if let Some(value) = env_u32("ST_POINTS_PER_LEVEL")? {
            self.budget.points_per_level = value;
        }
        if let Some(value) = env_u32("ST_STARTING_POINTS")? {
            self.budget.starting_points = value;
        }

        if let Some(value) = env_string("ST_OUTPUT_FORMAT") {
            self.output.format = value;
        }
        if let Some(value) = env_bool("ST_COLOR") {
            self.output.color = value;
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.storage.db_file.trim().is_empty() {
            return Err(StError::MissingConfig("storage.db_file".to_string()));
        }
        if !matches!(self.output.format.as_str(), "human" | "json" | "yaml" | "plain") {
            return Err(StError::Config(format!(
                "invalid output.format {} (expected human|json|yaml|plain)",
                self.output.format
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file, relative to the root directory unless absolute.
    #[serde(default)]
    pub db_file: String,
    /// How long a writer waits for the per-scope lock.
    #[serde(default)]
    pub lock_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_file: "skilltree.db".to_string(),
            lock_timeout_ms: 5_000,
        }
    }
}

impl StorageConfig {
    fn merge(&mut self, patch: StoragePatch) {
        if let Some(value) = patch.db_file {
            self.db_file = value;
        }
        if let Some(value) = patch.lock_timeout_ms {
            self.lock_timeout_ms = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    #[serde(default)]
    pub points_per_level: u32,
    #[serde(default)]
    pub starting_points: u32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            points_per_level: 1,
            starting_points: 0,
        }
    }
}

impl BudgetConfig {
    fn merge(&mut self, patch: BudgetPatch) {
        if let Some(value) = patch.points_per_level {
            self.points_per_level = value;
        }
        if let Some(value) = patch.starting_points {
            self.starting_points = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            color: true,
        }
    }
}

impl OutputConfig {
    fn merge(&mut self, patch: OutputPatch) {
        if let Some(value) = patch.format {
            self.format = value;
        }
        if let Some(value) = patch.color {
            self.color = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub storage: Option<StoragePatch>,
    pub budget: Option<BudgetPatch>,
    pub output: Option<OutputPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StoragePatch {
    pub db_file: Option<String>,
    pub lock_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct BudgetPatch {
    pub points_per_level: Option<u32>,
    pub starting_points: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OutputPatch {
    pub format: Option<String>,
    pub color: Option<bool>,
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

fn env_u32(key: &str) -> Result<Option<u32>> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<u32>()
            .map(Some)
            .map_err(|err| StError::Config(format!("invalid {key} value {value}: {err}"))),
        Err(_) => Ok(None),
    }
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|err| StError::Config(format!("invalid {key} value {value}: {err}"))),
        Err(_) => Ok(None),
    }
}
