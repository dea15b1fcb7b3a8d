use proptest::prelude::*;

use skilltree::core::{load_graph, load_ledger, Ledger, ScopeState};
use skilltree::storage::{ScopeSnapshot, SnapshotFormat};

use crate::strategies::{arb_dag_parts, arb_ops, node_id, scope, Op};

fn play(state: ScopeState, ops: Vec<Op>) -> ScopeState {
    ops.into_iter().fold(state, |state, op| {
        let next = match op {
            Op::Invest(i) => state.invest(&node_id(i)),
            Op::Refund(i) => state.refund(&node_id(i)),
        };
        next.unwrap_or(state)
    })
}

proptest! {
    #[test]
    fn ledger_entries_round_trip(entries in prop::collection::btree_map("[a-z]{1,6}", 1u32..10, 0..20)) {
        let ledger = Ledger::from_entries(entries.clone());
        prop_assert_eq!(load_ledger(ledger.to_entries()), ledger.clone());
        prop_assert_eq!(ledger.len(), entries.len());
    }

    #[test]
    fn zero_entries_are_dropped(id in "[a-z]{1,6}") {
        let ledger = Ledger::from_entries([(id.clone(), 0)]);
        prop_assert!(ledger.is_empty());
        prop_assert_eq!(ledger.points(&id), 0);
    }

    #[test]
    fn snapshots_round_trip_played_states(
        (nodes, edges) in arb_dag_parts(8),
        budget in 0u32..12,
        ops in arb_ops(30),
    ) {
        let graph = load_graph(scope(), nodes, edges).unwrap();
        let state = play(ScopeState::new(graph, Ledger::new(), budget).unwrap(), ops);

        for format in [SnapshotFormat::Json, SnapshotFormat::Yaml] {
            let rendered = ScopeSnapshot::from_state(&state).render(format).unwrap();
            let restored = ScopeSnapshot::parse(&rendered, format)
                .unwrap()
                .into_state(None)
                .unwrap();
            prop_assert_eq!(&restored.ledger, &state.ledger);
            prop_assert_eq!(restored.budget, state.budget);
            prop_assert_eq!(restored.graph.edges(), state.graph.edges());
        }
    }
}
