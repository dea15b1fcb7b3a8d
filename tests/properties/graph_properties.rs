use proptest::prelude::*;

use skilltree::core::{load_graph, SkillEdge};
use skilltree::GraphError;

use crate::strategies::{arb_dag_parts, node_id, scope};

proptest! {
    #[test]
    fn forward_edges_always_load((nodes, edges) in arb_dag_parts(12)) {
        let graph = load_graph(scope(), nodes, edges).unwrap();
        prop_assert_eq!(graph.topological_order().len(), graph.node_count());
    }

    #[test]
    fn any_back_edge_onto_a_path_is_a_cycle((nodes, edges) in arb_dag_parts(12)) {
        // Reverse an existing edge: child -> parent closes parent -> child.
        prop_assume!(!edges.is_empty());
        let first = edges[0].clone();
        let mut with_back = edges.clone();
        with_back.push(SkillEdge::new(first.child_id.clone(), first.parent_id.clone(), 1));

        let result = load_graph(scope(), nodes.clone(), with_back);
        let is_cycle = matches!(result, Err(GraphError::Cycle { .. }));
        prop_assert!(is_cycle, "expected a cycle error, got {:?}", result.map(|_| ()));

        let graph = load_graph(scope(), nodes, edges).unwrap();
        let is_cycle = matches!(
            graph.add_edge(SkillEdge::new(first.child_id, first.parent_id, 1)),
            Err(GraphError::Cycle { .. })
        );
        prop_assert!(is_cycle);
    }

    #[test]
    fn cycle_path_is_closed((nodes, _edges) in arb_dag_parts(8)) {
        prop_assume!(nodes.len() >= 3);
        let ring = vec![
            SkillEdge::new(node_id(0), node_id(1), 1),
            SkillEdge::new(node_id(1), node_id(2), 1),
            SkillEdge::new(node_id(2), node_id(0), 1),
        ];
        match load_graph(scope(), nodes, ring) {
            Err(GraphError::Cycle { path }) => {
                prop_assert!(path.len() >= 4);
                prop_assert_eq!(path.first(), path.last());
            }
            other => prop_assert!(false, "expected cycle, got {:?}", other.map(|_| ())),
        }
    }
}
