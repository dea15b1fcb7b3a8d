//! Effect Aggregation
//!
//! Every node carries an [`EffectKind`]. Invested nodes contribute a value
//! (see [`SkillNode::value_at`]) and contributions of the same kind are folded
//! with that kind's [`CombineRule`]. The resulting [`EffectTotals`] is the only
//! contract with consumers such as reward calculation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use tracing::trace;

use crate::core::graph::SkillGraph;
use crate::core::ledger::Ledger;
use crate::core::node::SkillNode;

/// Task difficulty tiers that carry their own XP bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Epic,
}

impl Difficulty {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Epic => "epic",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            "epic" => Ok(Self::Epic),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

/// How values of one effect kind combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineRule {
    /// Plain sum.
    Additive,
    /// Percentages compound: `(∏(1 + v/100) - 1) * 100`.
    Multiplicative,
    /// Active if any node of the kind holds a point; reported as `1.0`.
    Flag,
}

/// The modifier a node contributes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectKind {
    /// Global XP multiplier, in percent.
    XpMultiplier,
    /// Flat percentage bonus on task XP.
    TaskXpBonus,
    DifficultyXpBonus { difficulty: Difficulty },
    CategoryXpBoost { category_id: String },
    CategoryXpMultiplier { category_id: String },
    /// Extra collection slots.
    CollectionSlotIncrease,
    StreakProtection,
    FeatureUnlock { feature: String },
}

impl EffectKind {
    pub const fn rule(&self) -> CombineRule {
        match self {
            Self::XpMultiplier | Self::CategoryXpMultiplier { .. } => CombineRule::Multiplicative,
            Self::TaskXpBonus
            | Self::DifficultyXpBonus { .. }
            | Self::CategoryXpBoost { .. }
            | Self::CollectionSlotIncrease => CombineRule::Additive,
            Self::StreakProtection | Self::FeatureUnlock { .. } => CombineRule::Flag,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::XpMultiplier => "xp_multiplier",
            Self::TaskXpBonus => "task_xp_bonus",
            Self::DifficultyXpBonus { .. } => "difficulty_xp_bonus",
            Self::CategoryXpBoost { .. } => "category_xp_boost",
            Self::CategoryXpMultiplier { .. } => "category_xp_multiplier",
            Self::CollectionSlotIncrease => "collection_slot_increase",
            Self::StreakProtection => "streak_protection",
            Self::FeatureUnlock { .. } => "feature_unlock",
        }
    }

    fn qualifier(&self) -> Option<&str> {
        match self {
            Self::DifficultyXpBonus { difficulty } => Some(difficulty.as_str()),
            Self::CategoryXpBoost { category_id } | Self::CategoryXpMultiplier { category_id } => {
                Some(category_id)
            }
            Self::FeatureUnlock { feature } => Some(feature),
            _ => None,
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.qualifier() {
            Some(q) => write!(f, "{}:{q}", self.name()),
            None => f.write_str(self.name()),
        }
    }
}

impl FromStr for EffectKind {
    type Err = String;

    /// Parses the [`Display`](fmt::Display) form, e.g. `category_xp_boost:fitness`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, qualifier) = match s.trim().split_once(':') {
            Some((name, q)) => (name, Some(q.trim())),
            None => (s.trim(), None),
        };
        let require = |what: &str| -> Result<String, String> {
            match qualifier {
                Some(q) if !q.is_empty() => Ok(q.to_string()),
                _ => Err(format!("effect kind '{name}' needs a {what} (e.g. '{name}:<{what}>')")),
            }
        };
        let kind = match name {
            "xp_multiplier" => Self::XpMultiplier,
            "task_xp_bonus" => Self::TaskXpBonus,
            "difficulty_xp_bonus" => Self::DifficultyXpBonus {
                difficulty: require("difficulty")?.parse()?,
            },
            "category_xp_boost" => Self::CategoryXpBoost {
                category_id: require("category")?,
            },
            "category_xp_multiplier" => Self::CategoryXpMultiplier {
                category_id: require("category")?,
            },
            "collection_slot_increase" => Self::CollectionSlotIncrease,
            "streak_protection" => Self::StreakProtection,
            "feature_unlock" => Self::FeatureUnlock {
                feature: require("feature")?,
            },
            other => return Err(format!("unknown effect kind '{other}'")),
        };
        if kind.qualifier().is_none() && qualifier.is_some() {
            return Err(format!("effect kind '{name}' takes no qualifier"));
        }
        Ok(kind)
    }
}

/// One aggregated effect, as handed to consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectEntry {
    pub kind: EffectKind,
    pub rule: CombineRule,
    pub value: f64,
}

/// Aggregated effects keyed by kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectTotals {
    values: BTreeMap<EffectKind, f64>,
}

impl EffectTotals {
    /// Aggregated value, or `0.0` when no invested node has this kind.
    pub fn value(&self, kind: &EffectKind) -> f64 {
        self.values.get(kind).copied().unwrap_or(0.0)
    }

    pub fn get(&self, kind: &EffectKind) -> Option<f64> {
        self.values.get(kind).copied()
    }

    pub fn is_active(&self, kind: &EffectKind) -> bool {
        self.values.contains_key(kind)
    }

    /// Global XP multiplier as a factor (`1.21` for +21%).
    pub fn xp_factor(&self) -> f64 {
        1.0 + self.value(&EffectKind::XpMultiplier) / 100.0
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EffectKind, f64)> {
        self.values.iter().map(|(k, v)| (k, *v))
    }

    pub fn entries(&self) -> Vec<EffectEntry> {
        self.values
            .iter()
            .map(|(kind, value)| EffectEntry {
                kind: kind.clone(),
                rule: kind.rule(),
                value: *value,
            })
            .collect()
    }
}

impl Serialize for EffectTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.entries();
        let mut seq = serializer.serialize_seq(Some(entries.len()))?;
        for entry in &entries {
            seq.serialize_element(entry)?;
        }
        seq.end()
    }
}

enum Accumulator {
    Sum(f64),
    Product(f64),
    Flag,
}

impl Accumulator {
    fn start(rule: CombineRule) -> Self {
        match rule {
            CombineRule::Additive => Self::Sum(0.0),
            CombineRule::Multiplicative => Self::Product(1.0),
            CombineRule::Flag => Self::Flag,
        }
    }

    fn push(&mut self, value: f64) {
        match self {
            Self::Sum(total) => *total += value,
            Self::Product(factor) => *factor *= 1.0 + value / 100.0,
            Self::Flag => {}
        }
    }

    fn finish(self) -> f64 {
        match self {
            Self::Sum(total) => total,
            Self::Product(factor) => (factor - 1.0) * 100.0,
            Self::Flag => 1.0,
        }
    }
}

/// Fold every invested node's value into per-kind totals.
///
/// Nodes with zero points contribute nothing, including their `base_value`.
/// Pure: the same graph and ledger always produce the same totals.
pub fn aggregate_effects(graph: &SkillGraph, ledger: &Ledger) -> EffectTotals {
    let mut acc: BTreeMap<EffectKind, Accumulator> = BTreeMap::new();

    for node in graph.nodes() {
        let points = ledger.points(&node.id);
        let Some(value) = node.value_at(points) else {
            continue;
        };
        trace!(node = %node.id, kind = %node.effect_kind, points, value, "effect contribution");
        acc.entry(node.effect_kind.clone())
            .or_insert_with(|| Accumulator::start(node.effect_kind.rule()))
            .push(value);
    }

    EffectTotals {
        values: acc.into_iter().map(|(k, a)| (k, a.finish())).collect(),
    }
}

/// Contribution of a single node at its current investment.
pub fn node_contribution(node: &SkillNode, ledger: &Ledger) -> Option<f64> {
    node.value_at(ledger.points(&node.id))
}
