//! Availability resolution.
//!
//! A node is available when every incoming prerequisite is met by the current
//! ledger. Nothing here is cached; callers recompute after each ledger change.

use serde::{Deserialize, Serialize};

use crate::core::graph::SkillGraph;
use crate::core::ledger::Ledger;

/// Per-node view for presentation and hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub node_id: String,
    pub is_available: bool,
    pub current_investment: u32,
    pub max_investment: u32,
    pub is_maxed: bool,
}

/// A prerequisite that the ledger does not yet satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmetPrerequisite {
    pub parent_id: String,
    pub required: u32,
    pub current: u32,
}

/// True iff every parent edge's threshold is met (AND across all parents).
/// Nodes without parents are always available; unknown nodes never are.
pub fn is_available(graph: &SkillGraph, ledger: &Ledger, node_id: &str) -> bool {
    graph.contains(node_id)
        && graph
            .parents_of(node_id)
            .into_iter()
            .all(|(parent, min)| ledger.points(parent) >= min)
}

/// Prerequisites of `node_id` that are not yet met.
pub fn missing_prerequisites(
    graph: &SkillGraph,
    ledger: &Ledger,
    node_id: &str,
) -> Vec<UnmetPrerequisite> {
    graph
        .parents_of(node_id)
        .into_iter()
        .filter_map(|(parent, min)| {
            let current = ledger.points(parent);
            (current < min).then(|| UnmetPrerequisite {
                parent_id: parent.to_string(),
                required: min,
                current,
            })
        })
        .collect()
}

/// Status of every node, parents before children.
pub fn compute_status(graph: &SkillGraph, ledger: &Ledger) -> Vec<NodeStatus> {
    graph
        .topological_order()
        .into_iter()
        .filter_map(|id| graph.get_node(id))
        .map(|node| {
            let current = ledger.points(&node.id);
            NodeStatus {
                node_id: node.id.clone(),
                is_available: is_available(graph, ledger, &node.id),
                current_investment: current,
                max_investment: node.max_investment,
                is_maxed: current >= node.max_investment,
            }
        })
        .collect()
}
