use proptest::prelude::*;

use skilltree::core::{EffectKind, Scope, SkillEdge, SkillNode};

pub fn arb_kind() -> impl Strategy<Value = EffectKind> {
    prop_oneof![
        Just(EffectKind::XpMultiplier),
        Just(EffectKind::TaskXpBonus),
        Just(EffectKind::CollectionSlotIncrease),
        Just(EffectKind::StreakProtection),
        "[a-z]{3,6}".prop_map(|category_id| EffectKind::CategoryXpMultiplier { category_id }),
    ]
}

pub fn node_id(index: usize) -> String {
    format!("n{index:02}")
}

/// Nodes plus forward-only edges (lower index to higher), so acyclic.
pub fn arb_dag_parts(max_nodes: usize) -> impl Strategy<Value = (Vec<SkillNode>, Vec<SkillEdge>)> {
    (1..=max_nodes).prop_flat_map(|count| {
        let nodes = prop::collection::vec((arb_kind(), 0.0f64..30.0, 0.0f64..5.0, 1u32..4), count);
        let edges = prop::collection::vec((0..count, 0..count, 1u32..4), 0..=count * 2);
        (nodes, edges).prop_map(|(raw_nodes, raw_edges)| {
            let nodes: Vec<SkillNode> = raw_nodes
                .into_iter()
                .enumerate()
                .map(|(i, (kind, base, scaling, max))| {
                    SkillNode::new(node_id(i), format!("Node {i}"), kind)
                        .with_values(base, scaling)
                        .with_max_investment(max)
                })
                .collect();
            let mut edges: Vec<SkillEdge> = Vec::new();
            for (a, b, min) in raw_edges {
                if a == b {
                    continue;
                }
                let (parent, child) = (a.min(b), a.max(b));
                let min = min.min(nodes[parent].max_investment);
                if edges
                    .iter()
                    .any(|e| e.parent_id == node_id(parent) && e.child_id == node_id(child))
                {
                    continue;
                }
                edges.push(SkillEdge::new(node_id(parent), node_id(child), min));
            }
            (nodes, edges)
        })
    })
}

#[derive(Debug, Clone)]
pub enum Op {
    Invest(usize),
    Refund(usize),
}

pub fn arb_ops(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            3 => (0usize..16).prop_map(Op::Invest),
            1 => (0usize..16).prop_map(Op::Refund),
        ],
        0..max_len,
    )
}

pub fn scope() -> Scope {
    Scope::Global
}
