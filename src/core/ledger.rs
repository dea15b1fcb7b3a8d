//! Investment ledger: points invested per node for one scope.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single persisted ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub node_id: String,
    pub points: u32,
}

/// Mapping `node_id -> points`. Zero entries are never stored, so two ledgers
/// that agree on every node's points compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, u32>", into = "BTreeMap<String, u32>")]
pub struct Ledger {
    points: BTreeMap<String, u32>,
}

impl From<BTreeMap<String, u32>> for Ledger {
    fn from(points: BTreeMap<String, u32>) -> Self {
        Self::from_entries(points)
    }
}

impl From<Ledger> for BTreeMap<String, u32> {
    fn from(ledger: Ledger) -> Self {
        ledger.points
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from `(node_id, points)` pairs; later pairs win.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, u32)>,
        K: Into<String>,
    {
        let mut ledger = Self::new();
        for (node_id, points) in entries {
            ledger.set(node_id.into(), points);
        }
        ledger
    }

    /// Points currently invested in `node_id` (0 when absent).
    pub fn points(&self, node_id: &str) -> u32 {
        self.points.get(node_id).copied().unwrap_or(0)
    }

    pub fn set(&mut self, node_id: String, points: u32) {
        if points == 0 {
            self.points.remove(&node_id);
        } else {
            self.points.insert(node_id, points);
        }
    }

    /// Remove a node's entry, returning the points it held.
    pub fn remove(&mut self, node_id: &str) -> u32 {
        self.points.remove(node_id).unwrap_or(0)
    }

    /// Copy with `node_id` shifted by `delta`. Callers validate bounds first.
    pub(crate) fn with_delta(&self, node_id: &str, delta: i64) -> Self {
        let mut next = self.clone();
        let current = i64::from(self.points(node_id));
        let updated = u32::try_from((current + delta).max(0)).unwrap_or(u32::MAX);
        next.set(node_id.to_string(), updated);
        next
    }

    /// Sum of all invested points.
    pub fn total_invested(&self) -> u64 {
        self.points.values().map(|p| u64::from(*p)).sum()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.points.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Entries for persistence, ordered by node id.
    pub fn to_entries(&self) -> Vec<LedgerEntry> {
        self.iter()
            .map(|(node_id, points)| LedgerEntry {
                node_id: node_id.to_string(),
                points,
            })
            .collect()
    }
}

/// Rebuild a ledger from persisted entries.
pub fn load_ledger(entries: impl IntoIterator<Item = LedgerEntry>) -> Ledger {
    Ledger::from_entries(entries.into_iter().map(|e| (e.node_id, e.points)))
}
