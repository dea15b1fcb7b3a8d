//! Portable scope snapshots (JSON or YAML).
//!
//! A snapshot carries the flat rows of one scope. Importing runs the same
//! validation as loading from the database, so a hand-edited file with a
//! cycle or an over-cap ledger is refused before anything is written.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{load_graph, load_ledger, LedgerEntry, Scope, ScopeState, SkillEdge, SkillNode};
use crate::error::{Result, StError};

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    /// Guess from a file extension; anything but `.yaml`/`.yml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

impl FromStr for SnapshotFormat {
    type Err = StError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(StError::ValidationFailed(format!(
                "unknown snapshot format '{other}' (expected json|yaml)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeSnapshot {
    pub format_version: u32,
    pub scope: Scope,
    #[serde(default)]
    pub nodes: Vec<SkillNode>,
    #[serde(default)]
    pub edges: Vec<SkillEdge>,
    #[serde(default)]
    pub ledger: Vec<LedgerEntry>,
    #[serde(default)]
    pub budget: u32,
}

impl ScopeSnapshot {
    pub fn from_state(state: &ScopeState) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            scope: state.scope().clone(),
            nodes: state.graph.nodes().cloned().collect(),
            edges: state.graph.edges().to_vec(),
            ledger: state.ledger.to_entries(),
            budget: state.budget,
        }
    }

    /// Validate and build the scope state, placing it in `target` when given.
    ///
    /// Retargeting rewrites every node's scope, so a snapshot exported from
    /// one category can seed another.
    pub fn into_state(self, target: Option<&Scope>) -> Result<ScopeState> {
        if self.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(StError::ValidationFailed(format!(
                "unsupported snapshot format_version {} (expected {SNAPSHOT_FORMAT_VERSION})",
                self.format_version
            )));
        }
        let scope = target.cloned().unwrap_or(self.scope);
        let nodes = if target.is_some() {
            self.nodes
                .into_iter()
                .map(|node| node.with_scope(scope.clone()))
                .collect()
        } else {
            self.nodes
        };
        let graph = load_graph(scope, nodes, self.edges)?;
        let ledger = load_ledger(self.ledger);
        Ok(ScopeState::new(graph, ledger, self.budget)?)
    }

    pub fn render(&self, format: SnapshotFormat) -> Result<String> {
        Ok(match format {
            SnapshotFormat::Json => serde_json::to_string_pretty(self)?,
            SnapshotFormat::Yaml => serde_yaml::to_string(self)?,
        })
    }

    pub fn parse(raw: &str, format: SnapshotFormat) -> Result<Self> {
        Ok(match format {
            SnapshotFormat::Json => serde_json::from_str(raw)?,
            SnapshotFormat::Yaml => serde_yaml::from_str(raw)?,
        })
    }

    pub fn write_to(&self, path: &Path, format: SnapshotFormat) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.render(format)?)?;
        Ok(())
    }

    pub fn read_from(path: &Path, format: SnapshotFormat) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw, format)
    }
}
