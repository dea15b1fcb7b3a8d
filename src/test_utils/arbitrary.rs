use proptest::prelude::*;

use crate::config::{BudgetConfig, Config, OutputConfig, StorageConfig};
use crate::core::{load_graph, Difficulty, EffectKind, Scope, SkillEdge, SkillGraph, SkillNode};

fn arb_difficulty() -> impl Strategy<Value = Difficulty> {
    prop_oneof![
        Just(Difficulty::Easy),
        Just(Difficulty::Medium),
        Just(Difficulty::Hard),
        Just(Difficulty::Epic),
    ]
}

pub fn arb_effect_kind() -> impl Strategy<Value = EffectKind> {
    prop_oneof![
        Just(EffectKind::XpMultiplier),
        Just(EffectKind::TaskXpBonus),
        arb_difficulty().prop_map(|difficulty| EffectKind::DifficultyXpBonus { difficulty }),
        "[a-z]{3,8}".prop_map(|category_id| EffectKind::CategoryXpBoost { category_id }),
        "[a-z]{3,8}".prop_map(|category_id| EffectKind::CategoryXpMultiplier { category_id }),
        Just(EffectKind::CollectionSlotIncrease),
        Just(EffectKind::StreakProtection),
        "[a-z]{3,8}".prop_map(|feature| EffectKind::FeatureUnlock { feature }),
    ]
}

fn arb_node(id: String) -> impl Strategy<Value = SkillNode> {
    (arb_effect_kind(), 0.0f64..50.0, 0.0f64..10.0, 1u32..5).prop_map(
        move |(kind, base, scaling, max)| {
            SkillNode::new(id.clone(), id.to_uppercase(), kind)
                .with_values(base, scaling)
                .with_max_investment(max)
        },
    )
}

/// Acyclic graph: edges only run from a lower node index to a higher one.
pub fn arb_dag(max_nodes: usize) -> impl Strategy<Value = SkillGraph> {
    (1..=max_nodes)
        .prop_flat_map(|count| {
            let nodes: Vec<_> = (0..count).map(|i| arb_node(format!("n{i:02}"))).collect();
            let edges = prop::collection::vec((0..count, 0..count, 1u32..3), 0..count * 2);
            (nodes, edges)
        })
        .prop_map(|(nodes, raw_edges)| {
            let mut edges: Vec<SkillEdge> = Vec::new();
            for (a, b, min) in raw_edges {
                let (parent, child) = match a.cmp(&b) {
                    std::cmp::Ordering::Less => (a, b),
                    std::cmp::Ordering::Greater => (b, a),
                    std::cmp::Ordering::Equal => continue,
                };
                let min = min.min(nodes[parent].max_investment);
                let edge = SkillEdge::new(format!("n{parent:02}"), format!("n{child:02}"), min);
                if !edges
                    .iter()
                    .any(|e| e.parent_id == edge.parent_id && e.child_id == edge.child_id)
                {
                    edges.push(edge);
                }
            }
            load_graph(Scope::Global, nodes, edges).expect("forward edges never form a cycle")
        })
}

pub fn arb_config() -> impl Strategy<Value = Config> {
    (
        "[a-z]{1,12}\\.db",
        0u64..60_000,
        0u32..10,
        0u32..100,
        prop_oneof![Just("human"), Just("json"), Just("yaml"), Just("plain")],
        any::<bool>(),
    )
        .prop_map(
            |(db_file, lock_timeout_ms, points_per_level, starting_points, format, color)| Config {
                storage: StorageConfig {
                    db_file,
                    lock_timeout_ms,
                },
                budget: BudgetConfig {
                    points_per_level,
                    starting_points,
                },
                output: OutputConfig {
                    format: format.to_string(),
                    color,
                },
            },
        )
}

mod tests {
    use super::*;
    use crate::core::{compute_status, Ledger};

    proptest! {
        #[test]
        fn generated_dags_have_full_topological_order(graph in arb_dag(12)) {
            prop_assert_eq!(graph.topological_order().len(), graph.node_count());
        }

        #[test]
        fn roots_are_available_on_empty_ledger(graph in arb_dag(12)) {
            let ledger = Ledger::new();
            for status in compute_status(&graph, &ledger) {
                let is_root = graph.parents_of(&status.node_id).is_empty();
                prop_assert_eq!(status.is_available, is_root);
            }
        }

        #[test]
        fn config_toml_round_trip(config in arb_config()) {
            let rendered = config.to_toml().unwrap();
            let parsed: Config = toml::from_str(&rendered).unwrap();
            prop_assert_eq!(parsed.to_toml().unwrap(), rendered);
        }

        #[test]
        fn effect_kind_display_parses_back(kind in arb_effect_kind()) {
            let parsed: EffectKind = kind.to_string().parse().unwrap();
            prop_assert_eq!(parsed, kind);
        }
    }
}
