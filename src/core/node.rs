//! Skill node definitions and scopes.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::effects::EffectKind;
use crate::error::GraphError;

static NODE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.:-]*$").expect("valid node id regex"));

/// An independent skill graph: either the global tree or one category's tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    #[default]
    Global,
    Category(String),
}

impl Scope {
    pub fn category(id: impl Into<String>) -> Self {
        Self::Category(id.into())
    }

    /// Stable string key used by storage and the CLI.
    pub fn key(&self) -> String {
        match self {
            Self::Global => "global".to_string(),
            Self::Category(id) => format!("category:{id}"),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("global") {
            return Ok(Self::Global);
        }
        match s.strip_prefix("category:") {
            Some(id) if !id.trim().is_empty() => Ok(Self::Category(id.trim().to_string())),
            _ => Err(format!(
                "invalid scope '{s}' (expected 'global' or 'category:<id>')"
            )),
        }
    }
}

/// One investable perk in a skill graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillNode {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub effect_kind: EffectKind,
    /// Value granted by the first invested point.
    pub base_value: f64,
    /// Increment granted by each point after the first.
    #[serde(default)]
    pub scaling_per_point: f64,
    pub max_investment: u32,
    #[serde(default)]
    pub scope: Scope,
}

impl SkillNode {
    pub fn new(id: impl Into<String>, title: impl Into<String>, effect_kind: EffectKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            effect_kind,
            base_value: 0.0,
            scaling_per_point: 0.0,
            max_investment: 1,
            scope: Scope::Global,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_values(mut self, base_value: f64, scaling_per_point: f64) -> Self {
        self.base_value = base_value;
        self.scaling_per_point = scaling_per_point;
        self
    }

    #[must_use]
    pub fn with_max_investment(mut self, max_investment: u32) -> Self {
        self.max_investment = max_investment;
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// True for single-point unlock nodes.
    pub fn is_binary(&self) -> bool {
        self.max_investment == 1
    }

    /// Effect value at the given investment. `None` while nothing is invested.
    pub fn value_at(&self, points: u32) -> Option<f64> {
        match points {
            0 => None,
            _ if self.is_binary() => Some(self.base_value),
            p => Some(self.base_value + self.scaling_per_point * f64::from(p - 1)),
        }
    }

    /// Check the per-node invariants.
    pub fn validate(&self) -> Result<(), GraphError> {
        if !NODE_ID_RE.is_match(&self.id) {
            return Err(GraphError::InvalidNode {
                node_id: self.id.clone(),
                reason: "id must be non-empty and contain only letters, digits, '_', '-', '.', ':'"
                    .to_string(),
            });
        }
        if self.max_investment < 1 {
            return Err(GraphError::InvalidNode {
                node_id: self.id.clone(),
                reason: "max_investment must be at least 1".to_string(),
            });
        }
        if !self.base_value.is_finite() || !self.scaling_per_point.is_finite() {
            return Err(GraphError::InvalidNode {
                node_id: self.id.clone(),
                reason: "base_value and scaling_per_point must be finite".to_string(),
            });
        }
        Ok(())
    }
}

/// Partial edit of a node. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub effect_kind: Option<EffectKind>,
    pub base_value: Option<f64>,
    pub scaling_per_point: Option<f64>,
    pub max_investment: Option<u32>,
}

impl NodeUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.effect_kind.is_none()
            && self.base_value.is_none()
            && self.scaling_per_point.is_none()
            && self.max_investment.is_none()
    }

    /// Apply the edit to a copy of `node`; the id and scope never change.
    pub fn apply_to(&self, node: &SkillNode) -> SkillNode {
        let mut updated = node.clone();
        if let Some(title) = &self.title {
            updated.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            updated.description.clone_from(description);
        }
        if let Some(kind) = &self.effect_kind {
            updated.effect_kind = kind.clone();
        }
        if let Some(base) = self.base_value {
            updated.base_value = base;
        }
        if let Some(scaling) = self.scaling_per_point {
            updated.scaling_per_point = scaling;
        }
        if let Some(max) = self.max_investment {
            updated.max_investment = max;
        }
        updated
    }
}
