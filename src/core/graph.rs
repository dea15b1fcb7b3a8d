//! Skill Graph Topology
//!
//! Nodes and prerequisite edges for one scope. The graph is an arena: nodes
//! live in a map keyed by id and edges refer to nodes only by id, so deleting
//! a node is a matter of dropping the entries that mention it.
//!
//! A graph is always acyclic. [`load_graph`] verifies this eagerly with Kahn's
//! algorithm, and every authoring operation re-checks before returning a new
//! graph; the receiver is never mutated.
//!
//! Edges are kept sorted by `(parent, child)` so outgoing lookups are a binary
//! search, and a child -> parents index answers incoming lookups.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::node::{NodeUpdate, Scope, SkillNode};
use crate::error::GraphError;

/// Prerequisite: `child_id` cannot take its first point until `parent_id`
/// holds at least `min_investment` points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillEdge {
    pub parent_id: String,
    pub child_id: String,
    pub min_investment: u32,
}

impl SkillEdge {
    pub fn new(
        parent_id: impl Into<String>,
        child_id: impl Into<String>,
        min_investment: u32,
    ) -> Self {
        Self {
            parent_id: parent_id.into(),
            child_id: child_id.into(),
            min_investment,
        }
    }

    fn key(&self) -> (&str, &str) {
        (self.parent_id.as_str(), self.child_id.as_str())
    }
}

/// Read-only topology of one scope.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SkillGraph {
    scope: Scope,
    nodes: BTreeMap<String, SkillNode>,
    edges: Vec<SkillEdge>,
    /// `child_id -> parent_id -> min_investment`, derived from `edges`.
    #[serde(skip)]
    parents: BTreeMap<String, BTreeMap<String, u32>>,
}

/// Build a graph from flat node and edge lists, rejecting any structural
/// violation. Cycles are detected here, not lazily.
pub fn load_graph(
    scope: Scope,
    nodes: Vec<SkillNode>,
    edges: Vec<SkillEdge>,
) -> Result<SkillGraph, GraphError> {
    let mut graph = SkillGraph::empty(scope);

    for node in nodes {
        graph.check_new_node(&node)?;
        graph.nodes.insert(node.id.clone(), node);
    }

    for edge in edges {
        graph.check_new_edge(&edge)?;
        graph.index_edge(&edge);
        graph.edges.push(edge);
    }
    graph.sort_edges();

    if let Some(path) = graph.find_cycle() {
        return Err(GraphError::Cycle { path });
    }

    debug!(
        scope = %graph.scope,
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "loaded skill graph"
    );
    Ok(graph)
}

impl SkillGraph {
    /// An empty graph for `scope`.
    pub fn empty(scope: Scope) -> Self {
        Self {
            scope,
            nodes: BTreeMap::new(),
            edges: Vec::new(),
            parents: BTreeMap::new(),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn get_node(&self, node_id: &str) -> Option<&SkillNode> {
        self.nodes.get(node_id)
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// All nodes, ordered by id.
    pub fn nodes(&self) -> impl Iterator<Item = &SkillNode> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All edges, ordered by (parent, child).
    pub fn edges(&self) -> &[SkillEdge] {
        &self.edges
    }

    pub fn edge(&self, parent_id: &str, child_id: &str) -> Option<&SkillEdge> {
        self.edges
            .binary_search_by(|e| e.key().cmp(&(parent_id, child_id)))
            .ok()
            .map(|at| &self.edges[at])
    }

    /// Direct children of a node, ordered by id.
    pub fn children_of(&self, node_id: &str) -> Vec<&str> {
        self.outgoing(node_id).map(|e| e.child_id.as_str()).collect()
    }

    /// Incoming prerequisites of a node as `(parent_id, min_investment)`,
    /// ordered by parent id.
    pub fn parents_of(&self, node_id: &str) -> Vec<(&str, u32)> {
        self.parents
            .get(node_id)
            .map(|parents| parents.iter().map(|(p, min)| (p.as_str(), *min)).collect())
            .unwrap_or_default()
    }

    /// Outgoing edges of a node, ordered by child id.
    pub fn outgoing(&self, node_id: &str) -> impl Iterator<Item = &SkillEdge> {
        let start = self.edges.partition_point(|e| e.parent_id.as_str() < node_id);
        self.edges[start..]
            .iter()
            .take_while(move |e| e.parent_id == node_id)
    }

    /// Node ids with parents before children; ties broken by id.
    pub fn topological_order(&self) -> Vec<&str> {
        self.kahn().0
    }

    /// Kahn's algorithm. Returns the released order and the in-degree left
    /// on every node; nodes still above zero sit on or behind a cycle.
    fn kahn(&self) -> (Vec<&str>, BTreeMap<&str, usize>) {
        let mut in_degree: BTreeMap<&str, usize> =
            self.nodes.keys().map(|id| (id.as_str(), 0)).collect();
        for edge in &self.edges {
            if let Some(degree) = in_degree.get_mut(edge.child_id.as_str()) {
                *degree += 1;
            }
        }

        let mut ready: BTreeSet<&str> = in_degree
            .iter()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(id, _)| *id)
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(id) = ready.pop_first() {
            order.push(id);
            for child in self.children_of(id) {
                if let Some(degree) = in_degree.get_mut(child) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(child);
                    }
                }
            }
        }
        (order, in_degree)
    }

    // -------------------------------------------------------------------------
    // Authoring
    // -------------------------------------------------------------------------

    /// New graph with `node` added.
    pub fn add_node(&self, node: SkillNode) -> Result<Self, GraphError> {
        self.check_new_node(&node)?;
        let mut next = self.clone();
        next.nodes.insert(node.id.clone(), node);
        Ok(next)
    }

    /// New graph with `node_id` edited. Lowering `max_investment` below an
    /// outgoing edge threshold is rejected.
    pub fn update_node(&self, node_id: &str, update: &NodeUpdate) -> Result<Self, GraphError> {
        let current = self
            .get_node(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
        let updated = update.apply_to(current);
        updated.validate()?;

        if let Some(edge) = self
            .outgoing(node_id)
            .find(|e| e.min_investment > updated.max_investment)
        {
            return Err(GraphError::InvalidThreshold {
                parent_id: edge.parent_id.clone(),
                child_id: edge.child_id.clone(),
                min_investment: edge.min_investment,
                parent_max: updated.max_investment,
            });
        }

        let mut next = self.clone();
        next.nodes.insert(node_id.to_string(), updated);
        Ok(next)
    }

    /// New graph without `node_id` and without any edge touching it.
    pub fn delete_node(&self, node_id: &str) -> Result<Self, GraphError> {
        if !self.contains(node_id) {
            return Err(GraphError::NodeNotFound(node_id.to_string()));
        }
        let mut next = self.clone();
        next.nodes.remove(node_id);
        next.parents.remove(node_id);
        for child in self.children_of(node_id) {
            next.unindex_edge(node_id, child);
        }
        next.edges.retain(|e| e.parent_id != node_id && e.child_id != node_id);
        Ok(next)
    }

    /// New graph with `edge` added. Rejects edges that would close a cycle.
    pub fn add_edge(&self, edge: SkillEdge) -> Result<Self, GraphError> {
        self.check_new_edge(&edge)?;

        // parent -> child closes a cycle iff child already reaches parent.
        if let Some(mut path) = self.path_between(&edge.child_id, &edge.parent_id) {
            path.push(edge.child_id.clone());
            return Err(GraphError::Cycle { path });
        }

        let mut next = self.clone();
        next.index_edge(&edge);
        let at = next.edges.partition_point(|e| e.key() < edge.key());
        next.edges.insert(at, edge);
        Ok(next)
    }

    /// New graph without the `parent_id -> child_id` edge.
    pub fn delete_edge(&self, parent_id: &str, child_id: &str) -> Result<Self, GraphError> {
        if self.edge(parent_id, child_id).is_none() {
            return Err(GraphError::EdgeNotFound {
                parent_id: parent_id.to_string(),
                child_id: child_id.to_string(),
            });
        }
        let mut next = self.clone();
        next.unindex_edge(parent_id, child_id);
        next.edges.retain(|e| e.key() != (parent_id, child_id));
        Ok(next)
    }

    // -------------------------------------------------------------------------
    // Validation helpers
    // -------------------------------------------------------------------------

    fn check_new_node(&self, node: &SkillNode) -> Result<(), GraphError> {
        node.validate()?;
        if node.scope != self.scope {
            return Err(GraphError::ScopeMismatch {
                node_id: node.id.clone(),
                expected: self.scope.key(),
                found: node.scope.key(),
            });
        }
        if self.contains(&node.id) {
            return Err(GraphError::DuplicateNode(node.id.clone()));
        }
        Ok(())
    }

    fn check_new_edge(&self, edge: &SkillEdge) -> Result<(), GraphError> {
        if edge.parent_id == edge.child_id {
            return Err(GraphError::SelfLoop(edge.parent_id.clone()));
        }
        let dangling = |missing: &str| GraphError::DanglingReference {
            parent_id: edge.parent_id.clone(),
            child_id: edge.child_id.clone(),
            missing: missing.to_string(),
        };
        let parent = self
            .get_node(&edge.parent_id)
            .ok_or_else(|| dangling(&edge.parent_id))?;
        if !self.contains(&edge.child_id) {
            return Err(dangling(&edge.child_id));
        }
        let exists = self
            .parents
            .get(&edge.child_id)
            .is_some_and(|parents| parents.contains_key(&edge.parent_id));
        if exists {
            return Err(GraphError::DuplicateEdge {
                parent_id: edge.parent_id.clone(),
                child_id: edge.child_id.clone(),
            });
        }
        if edge.min_investment < 1 || edge.min_investment > parent.max_investment {
            return Err(GraphError::InvalidThreshold {
                parent_id: edge.parent_id.clone(),
                child_id: edge.child_id.clone(),
                min_investment: edge.min_investment,
                parent_max: parent.max_investment,
            });
        }
        Ok(())
    }

    fn sort_edges(&mut self) {
        self.edges.sort_by(|a, b| a.key().cmp(&b.key()));
    }

    fn index_edge(&mut self, edge: &SkillEdge) {
        self.parents
            .entry(edge.child_id.clone())
            .or_default()
            .insert(edge.parent_id.clone(), edge.min_investment);
    }

    fn unindex_edge(&mut self, parent_id: &str, child_id: &str) {
        if let Some(parents) = self.parents.get_mut(child_id) {
            parents.remove(parent_id);
            if parents.is_empty() {
                self.parents.remove(child_id);
            }
        }
    }

    /// Kahn's algorithm; on leftover nodes, extract one concrete cycle as a
    /// parent -> child path whose first and last ids match.
    ///
    /// Every leftover node still has a leftover parent, so following those
    /// parent links from any leftover node must revisit one. The walk is
    /// iterative and bounded by the node count.
    fn find_cycle(&self) -> Option<Vec<String>> {
        let (order, in_degree) = self.kahn();
        if order.len() == self.nodes.len() {
            return None;
        }

        let stuck = |id: &str| in_degree.get(id).is_some_and(|degree| *degree > 0);
        let start = in_degree
            .iter()
            .find(|&(_, &degree)| degree > 0)
            .map(|(id, _)| *id)?;

        let mut walk = vec![start];
        let mut position: HashMap<&str, usize> = HashMap::from([(start, 0)]);
        let mut cursor = start;
        loop {
            let parent = self
                .parents
                .get(cursor)?
                .keys()
                .map(String::as_str)
                .find(|p| stuck(p))?;
            if let Some(&at) = position.get(parent) {
                // walk[at..] runs child -> parent; reverse it and close the loop
                let mut cycle = Vec::with_capacity(walk.len() - at + 1);
                cycle.push(parent.to_string());
                cycle.extend(walk[at..].iter().rev().map(|id| (*id).to_string()));
                return Some(cycle);
            }
            position.insert(parent, walk.len());
            walk.push(parent);
            cursor = parent;
        }
    }

    /// BFS path `from -> ... -> to` along child edges, if one exists.
    fn path_between(&self, from: &str, to: &str) -> Option<Vec<String>> {
        let mut came_from: HashMap<&str, &str> = HashMap::new();
        let mut queue = VecDeque::from([from]);
        let mut seen = HashSet::from([from]);

        while let Some(current) = queue.pop_front() {
            if current == to {
                let mut path = vec![current.to_string()];
                let mut cursor = current;
                while let Some(&prev) = came_from.get(cursor) {
                    path.push(prev.to_string());
                    cursor = prev;
                }
                path.reverse();
                return Some(path);
            }
            for child in self.children_of(current) {
                if seen.insert(child) {
                    came_from.insert(child, current);
                    queue.push_back(child);
                }
            }
        }
        None
    }
}
