use skilltree::core::{
    load_graph, EffectKind, Ledger, NodeUpdate, Scope, ScopeState, SkillEdge, SkillNode,
};
use skilltree::test_utils::fixtures::{chain_graph, focus_tree, fresh_state};
use skilltree::GraphError;

fn node(id: &str) -> SkillNode {
    SkillNode::new(id, id.to_uppercase(), EffectKind::TaskXpBonus).with_max_investment(3)
}

#[test]
fn load_graph_rejects_cycles() {
    let err = load_graph(
        Scope::Global,
        vec![node("a"), node("b"), node("c")],
        vec![
            SkillEdge::new("a", "b", 1),
            SkillEdge::new("b", "c", 1),
            SkillEdge::new("c", "a", 1),
        ],
    )
    .unwrap_err();
    let GraphError::Cycle { path } = err else {
        panic!("expected a cycle, got {err:?}");
    };
    assert_eq!(path.first(), path.last());
    assert!(path.len() >= 4);
}

#[test]
fn add_edge_reports_the_closing_path() {
    let graph = chain_graph(Scope::Global);
    let err = graph.add_edge(SkillEdge::new("b", "a", 1)).unwrap_err();
    assert_eq!(
        err,
        GraphError::Cycle {
            path: vec!["a".into(), "b".into(), "a".into()]
        }
    );
}

#[test]
fn structural_errors_are_specific() {
    let graph = chain_graph(Scope::Global);
    assert!(matches!(
        graph.add_edge(SkillEdge::new("a", "a", 1)),
        Err(GraphError::SelfLoop(_))
    ));
    assert!(matches!(
        graph.add_edge(SkillEdge::new("a", "b", 1)),
        Err(GraphError::DuplicateEdge { .. })
    ));
    assert!(matches!(
        graph.add_edge(SkillEdge::new("a", "ghost", 1)),
        Err(GraphError::DanglingReference { missing, .. }) if missing == "ghost"
    ));
    assert!(matches!(
        graph.add_node(node("a")),
        Err(GraphError::DuplicateNode(_))
    ));
    assert!(matches!(
        graph.add_node(node("c").with_scope(Scope::category("fitness"))),
        Err(GraphError::ScopeMismatch { .. })
    ));
}

#[test]
fn threshold_must_fit_the_parent_cap() {
    let graph = chain_graph(Scope::Global);
    let graph = graph.add_node(node("c")).unwrap();
    assert!(matches!(
        graph.add_edge(SkillEdge::new("b", "c", 2)),
        Err(GraphError::InvalidThreshold { parent_max: 1, .. })
    ));
    assert!(matches!(
        graph.add_edge(SkillEdge::new("a", "c", 0)),
        Err(GraphError::InvalidThreshold { .. })
    ));
}

#[test]
fn authoring_returns_new_state_and_leaves_receiver_alone() {
    let state = fresh_state(chain_graph(Scope::Global), 2);
    let next = state.add_node(node("c")).unwrap();
    assert!(next.graph.contains("c"));
    assert!(!state.graph.contains("c"));

    let next = next.add_edge(SkillEdge::new("a", "c", 1)).unwrap();
    assert_eq!(state.graph.edges().len(), 1);
    assert_eq!(next.graph.edges().len(), 2);
    assert_eq!(next.graph.children_of("a"), vec!["b", "c"]);
}

#[test]
fn shrinking_a_cap_below_investment_is_rejected() {
    let state = ScopeState::new(
        chain_graph(Scope::Global),
        Ledger::from_entries([("a", 3)]),
        0,
    )
    .unwrap();
    let shrink = NodeUpdate {
        max_investment: Some(2),
        ..NodeUpdate::default()
    };
    assert!(matches!(
        state.update_node("a", &shrink),
        Err(GraphError::InvestmentExceedsCap { invested: 3, .. })
    ));

    // Below the a -> b threshold is a graph-level error even with no points.
    let state = fresh_state(chain_graph(Scope::Global), 0);
    let shrink = NodeUpdate {
        max_investment: Some(1),
        ..NodeUpdate::default()
    };
    assert!(matches!(
        state.update_node("a", &shrink),
        Err(GraphError::InvalidThreshold { .. })
    ));
}

#[test]
fn update_keeps_id_and_scope() {
    let state = fresh_state(chain_graph(Scope::Global), 0);
    let update = NodeUpdate {
        title: Some("Adept".into()),
        base_value: Some(7.0),
        ..NodeUpdate::default()
    };
    let next = state.update_node("a", &update).unwrap();
    let a = next.graph.get_node("a").unwrap();
    assert_eq!(a.title, "Adept");
    assert_eq!(a.base_value, 7.0);
    assert_eq!(a.scope, Scope::Global);
    assert_eq!(a.scaling_per_point, 5.0);
}

#[test]
fn linking_onto_an_invested_child_needs_the_parent_met() {
    let graph = chain_graph(Scope::Global).add_node(node("c")).unwrap();
    let state = ScopeState::new(graph, Ledger::from_entries([("c", 1)]), 0).unwrap();
    assert!(matches!(
        state.add_edge(SkillEdge::new("a", "c", 1)),
        Err(GraphError::UnmetPrerequisite { .. })
    ));
}

#[test]
fn delete_edge_unlocks_the_child() {
    let state = fresh_state(chain_graph(Scope::Global), 1);
    assert!(state.invest("b").is_err());
    let state = state.delete_edge("a", "b").unwrap();
    assert!(state.invest("b").is_ok());
    assert!(matches!(
        state.delete_edge("a", "b"),
        Err(GraphError::EdgeNotFound { .. })
    ));
}

#[test]
fn topological_order_respects_every_edge() {
    let graph = focus_tree(Scope::Global);
    let order = graph.topological_order();
    let position = |id: &str| order.iter().position(|n| *n == id).unwrap();
    for edge in graph.edges() {
        assert!(position(&edge.parent_id) < position(&edge.child_id));
    }
}

#[test]
fn ledger_inconsistent_with_graph_is_refused() {
    let graph = chain_graph(Scope::Global);
    assert!(matches!(
        ScopeState::new(graph.clone(), Ledger::from_entries([("a", 4)]), 0),
        Err(GraphError::InvestmentExceedsCap { .. })
    ));
    assert!(matches!(
        ScopeState::new(graph, Ledger::from_entries([("a", 1), ("b", 1)]), 0),
        Err(GraphError::UnmetPrerequisite { .. })
    ));
}
