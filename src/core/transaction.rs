//! Investment Transactions
//!
//! `invest` and `refund` validate every precondition before producing a new
//! ledger and budget, so a rejected call leaves the caller's state untouched
//! and there is never anything to roll back.
//!
//! [`ScopeState`] bundles graph, ledger and budget for one scope and adds the
//! authoring operations whose consistency depends on the ledger (deleting an
//! invested node, linking onto an invested child, shrinking a cap).

use serde::Serialize;
use tracing::debug;

use crate::core::availability::{compute_status, is_available, NodeStatus};
use crate::core::effects::{aggregate_effects, EffectTotals};
use crate::core::graph::{SkillEdge, SkillGraph};
use crate::core::ledger::Ledger;
use crate::core::node::{NodeUpdate, Scope, SkillNode};
use crate::error::{GraphError, RejectReason};

/// Put one point into `node_id`.
pub fn invest(
    graph: &SkillGraph,
    ledger: &Ledger,
    budget: u32,
    node_id: &str,
) -> Result<(Ledger, u32), RejectReason> {
    let node = graph
        .get_node(node_id)
        .ok_or_else(|| RejectReason::NodeNotFound(node_id.to_string()))?;
    if !is_available(graph, ledger, node_id) {
        return Err(RejectReason::NotAvailable(node_id.to_string()));
    }
    let current = ledger.points(node_id);
    if current >= node.max_investment {
        return Err(RejectReason::AlreadyMaxed(node_id.to_string()));
    }
    if budget < 1 {
        return Err(RejectReason::InsufficientBudget);
    }

    debug!(node = node_id, points = current + 1, budget = budget - 1, "invest accepted");
    Ok((ledger.with_delta(node_id, 1), budget - 1))
}

/// Take one point back out of `node_id`.
///
/// Rejected when a child that already holds points would be left with an
/// unmet prerequisite; descendants are never refunded implicitly.
pub fn refund(
    graph: &SkillGraph,
    ledger: &Ledger,
    budget: u32,
    node_id: &str,
) -> Result<(Ledger, u32), RejectReason> {
    if !graph.contains(node_id) {
        return Err(RejectReason::NodeNotFound(node_id.to_string()));
    }
    let current = ledger.points(node_id);
    if current == 0 {
        return Err(RejectReason::NothingInvested(node_id.to_string()));
    }
    let remaining = current - 1;
    if let Some(edge) = graph
        .outgoing(node_id)
        .find(|e| ledger.points(&e.child_id) > 0 && remaining < e.min_investment)
    {
        return Err(RejectReason::WouldInvalidateChild(edge.child_id.clone()));
    }

    debug!(node = node_id, points = remaining, budget = budget + 1, "refund accepted");
    Ok((ledger.with_delta(node_id, -1), budget.saturating_add(1)))
}

/// Check that a ledger is consistent with a graph: every entry names a known
/// node, stays within its cap, and every invested child has its
/// prerequisites met.
pub fn validate_ledger(graph: &SkillGraph, ledger: &Ledger) -> Result<(), GraphError> {
    for (node_id, points) in ledger.iter() {
        let node = graph
            .get_node(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
        if points > node.max_investment {
            return Err(GraphError::InvestmentExceedsCap {
                node_id: node_id.to_string(),
                invested: points,
                max_investment: node.max_investment,
            });
        }
        for (parent, min) in graph.parents_of(node_id) {
            let parent_points = ledger.points(parent);
            if parent_points < min {
                return Err(GraphError::UnmetPrerequisite {
                    parent_id: parent.to_string(),
                    child_id: node_id.to_string(),
                    min_investment: min,
                    parent_points,
                });
            }
        }
    }
    Ok(())
}

/// Graph, ledger and unspent budget of one scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeState {
    pub graph: SkillGraph,
    pub ledger: Ledger,
    pub budget: u32,
}

impl ScopeState {
    /// Bundle a scope, rejecting ledgers the graph cannot hold.
    pub fn new(graph: SkillGraph, ledger: Ledger, budget: u32) -> Result<Self, GraphError> {
        validate_ledger(&graph, &ledger)?;
        Ok(Self {
            graph,
            ledger,
            budget,
        })
    }

    pub fn empty(scope: Scope, budget: u32) -> Self {
        Self {
            graph: SkillGraph::empty(scope),
            ledger: Ledger::new(),
            budget,
        }
    }

    pub fn scope(&self) -> &Scope {
        self.graph.scope()
    }

    pub fn invest(&self, node_id: &str) -> Result<Self, RejectReason> {
        let (ledger, budget) = invest(&self.graph, &self.ledger, self.budget, node_id)?;
        Ok(self.with_ledger(ledger, budget))
    }

    pub fn refund(&self, node_id: &str) -> Result<Self, RejectReason> {
        let (ledger, budget) = refund(&self.graph, &self.ledger, self.budget, node_id)?;
        Ok(self.with_ledger(ledger, budget))
    }

    pub fn status(&self) -> Vec<NodeStatus> {
        compute_status(&self.graph, &self.ledger)
    }

    pub fn effects(&self) -> EffectTotals {
        aggregate_effects(&self.graph, &self.ledger)
    }

    pub fn add_node(&self, node: SkillNode) -> Result<Self, GraphError> {
        let graph = self.graph.add_node(node)?;
        Ok(self.with_graph(graph))
    }

    /// Edit a node. A cap below the node's current investment is rejected.
    pub fn update_node(&self, node_id: &str, update: &NodeUpdate) -> Result<Self, GraphError> {
        let graph = self.graph.update_node(node_id, update)?;
        if let Some(max) = update.max_investment {
            let invested = self.ledger.points(node_id);
            if invested > max {
                return Err(GraphError::InvestmentExceedsCap {
                    node_id: node_id.to_string(),
                    invested,
                    max_investment: max,
                });
            }
        }
        Ok(self.with_graph(graph))
    }

    /// Delete a node, its edges and its ledger entry; its points return to
    /// the budget. Former children are simply re-evaluated on next query.
    pub fn delete_node(&self, node_id: &str) -> Result<Self, GraphError> {
        let graph = self.graph.delete_node(node_id)?;
        let mut ledger = self.ledger.clone();
        let freed = ledger.remove(node_id);
        debug!(node = node_id, freed, "node deleted");
        Ok(Self {
            graph,
            ledger,
            budget: self.budget.saturating_add(freed),
        })
    }

    /// Link two nodes. Rejected if the child already holds points that the
    /// new prerequisite would leave unjustified.
    pub fn add_edge(&self, edge: SkillEdge) -> Result<Self, GraphError> {
        let parent_points = self.ledger.points(&edge.parent_id);
        let child_points = self.ledger.points(&edge.child_id);
        let graph = self.graph.add_edge(edge.clone())?;
        if child_points > 0 && parent_points < edge.min_investment {
            return Err(GraphError::UnmetPrerequisite {
                parent_id: edge.parent_id,
                child_id: edge.child_id,
                min_investment: edge.min_investment,
                parent_points,
            });
        }
        Ok(self.with_graph(graph))
    }

    pub fn delete_edge(&self, parent_id: &str, child_id: &str) -> Result<Self, GraphError> {
        let graph = self.graph.delete_edge(parent_id, child_id)?;
        Ok(self.with_graph(graph))
    }

    fn with_ledger(&self, ledger: Ledger, budget: u32) -> Self {
        Self {
            graph: self.graph.clone(),
            ledger,
            budget,
        }
    }

    fn with_graph(&self, graph: SkillGraph) -> Self {
        Self {
            graph,
            ledger: self.ledger.clone(),
            budget: self.budget,
        }
    }
}
