use proptest::prelude::*;

use skilltree::core::{aggregate_effects, load_graph, Ledger, ScopeState};

use crate::strategies::{arb_dag_parts, arb_ops, node_id, scope, Op};

fn assert_invariants(state: &ScopeState) -> Result<(), TestCaseError> {
    for node in state.graph.nodes() {
        let points = state.ledger.points(&node.id);
        prop_assert!(points <= node.max_investment, "{} over cap", node.id);
        if points > 0 {
            for (parent, min) in state.graph.parents_of(&node.id) {
                prop_assert!(
                    state.ledger.points(parent) >= min,
                    "{} invested with {} below {}",
                    node.id,
                    parent,
                    min
                );
            }
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn invariants_hold_for_any_operation_sequence(
        (nodes, edges) in arb_dag_parts(10),
        budget in 0u32..20,
        ops in arb_ops(60),
    ) {
        let graph = load_graph(scope(), nodes, edges).unwrap();
        let mut state = ScopeState::new(graph, Ledger::new(), budget).unwrap();
        let mut invests: i64 = 0;
        let mut refunds: i64 = 0;

        for op in ops {
            let (result, is_invest) = match op {
                Op::Invest(i) => (state.invest(&node_id(i)), true),
                Op::Refund(i) => (state.refund(&node_id(i)), false),
            };
            if let Ok(next) = result {
                if is_invest {
                    invests += 1;
                } else {
                    refunds += 1;
                }
                state = next;
            }
            assert_invariants(&state)?;
            prop_assert_eq!(
                i64::from(budget) - invests + refunds,
                i64::from(state.budget)
            );
            prop_assert_eq!(
                state.ledger.total_invested() + u64::from(state.budget),
                u64::from(budget)
            );
        }
    }

    #[test]
    fn rejected_operations_leave_state_untouched(
        (nodes, edges) in arb_dag_parts(8),
        budget in 0u32..6,
        ops in arb_ops(30),
    ) {
        let graph = load_graph(scope(), nodes, edges).unwrap();
        let mut state = ScopeState::new(graph, Ledger::new(), budget).unwrap();
        for op in ops {
            let before = state.clone();
            let result = match op {
                Op::Invest(i) => state.invest(&node_id(i)),
                Op::Refund(i) => state.refund(&node_id(i)),
            };
            prop_assert_eq!(&state, &before);
            if let Ok(next) = result {
                state = next;
            }
        }
    }

    #[test]
    fn aggregation_is_pure(
        (nodes, edges) in arb_dag_parts(10),
        ops in arb_ops(40),
    ) {
        let graph = load_graph(scope(), nodes, edges).unwrap();
        let mut state = ScopeState::new(graph, Ledger::new(), 40).unwrap();
        for op in ops {
            if let Op::Invest(i) = op {
                if let Ok(next) = state.invest(&node_id(i)) {
                    state = next;
                }
            }
        }
        let first = aggregate_effects(&state.graph, &state.ledger);
        let second = aggregate_effects(&state.graph, &state.ledger);
        prop_assert_eq!(first, second);
    }
}
