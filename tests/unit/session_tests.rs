//! Persistence through `ScopeSession`: locks, transactions, and the event log.

use skilltree::budget::{FixedBudget, LevelBudget};
use skilltree::core::{EffectKind, Scope, SkillNode};
use skilltree::storage::{ScopeSnapshot, SnapshotFormat};
use skilltree::test_utils::fixtures::{chain_graph, fresh_state, ScopeFixture};
use skilltree::{RejectReason, StError};

#[test]
fn invest_commits_state_and_event() {
    let fixture = ScopeFixture::new();
    fixture.seed(&fresh_state(chain_graph(Scope::Global), 3));
    let session = fixture.session();

    let outcome = session.invest(&Scope::Global, "a").unwrap();
    assert_eq!(outcome.points, 1);
    assert_eq!(outcome.budget, 2);
    assert_eq!(outcome.event.delta, 1);
    assert_eq!(outcome.event.budget_after, 2);

    let stored = session.load(&Scope::Global).unwrap();
    assert_eq!(stored.ledger.points("a"), 1);
    assert_eq!(stored.budget, 2);

    let events = fixture.db.list_events(&Scope::Global, 10).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].node_id, "a");
}

#[test]
fn invest_is_not_committed_without_its_event() {
    let fixture = ScopeFixture::new();
    let seeded = fresh_state(chain_graph(Scope::Global), 3);
    fixture.seed(&seeded);
    fixture
        .db
        .conn()
        .execute_batch(
            "CREATE TRIGGER refuse_events BEFORE INSERT ON investment_events
             BEGIN SELECT RAISE(ABORT, 'events refused'); END;",
        )
        .unwrap();
    let session = fixture.session();

    let err = session.invest(&Scope::Global, "a").unwrap_err();
    assert!(!err.is_rejection());

    let stored = session.load(&Scope::Global).unwrap();
    assert_eq!(stored, seeded);
    assert_eq!(stored.ledger.points("a"), 0);
    assert_eq!(stored.budget, 3);
    assert!(fixture.db.list_events(&Scope::Global, 10).unwrap().is_empty());
}

#[test]
fn rejected_invest_writes_nothing() {
    let fixture = ScopeFixture::new();
    let seeded = fresh_state(chain_graph(Scope::Global), 3);
    fixture.seed(&seeded);
    let session = fixture.session();

    let err = session.invest(&Scope::Global, "b").unwrap_err();
    assert!(matches!(
        err,
        StError::Rejected(RejectReason::NotAvailable(ref id)) if id == "b"
    ));
    assert!(err.is_rejection());

    assert_eq!(session.load(&Scope::Global).unwrap(), seeded);
    assert!(fixture.db.list_events(&Scope::Global, 10).unwrap().is_empty());
}

#[test]
fn scopes_are_isolated() {
    let fixture = ScopeFixture::new();
    let fitness = Scope::category("fitness");
    fixture.seed(&fresh_state(chain_graph(Scope::Global), 1));
    fixture.seed(&fresh_state(chain_graph(fitness.clone()), 5));
    let session = fixture.session();

    session.invest(&fitness, "a").unwrap();
    session.invest(&fitness, "a").unwrap();
    session.invest(&fitness, "b").unwrap();

    let global = session.load(&Scope::Global).unwrap();
    assert!(global.ledger.is_empty());
    assert_eq!(global.budget, 1);

    let summaries = fixture.db.list_scopes().unwrap();
    assert_eq!(summaries.len(), 2);
    let fit = summaries.iter().find(|s| s.scope == fitness).unwrap();
    assert_eq!(fit.invested, 3);
    assert_eq!(fit.budget, Some(2));
}

#[test]
fn authoring_through_the_session_persists() {
    let fixture = ScopeFixture::new();
    let session = fixture.session();
    let node = SkillNode::new("focus", "Focus", EffectKind::XpMultiplier).with_values(10.0, 0.0);

    session
        .author(&Scope::Global, "node add", |state| state.add_node(node))
        .unwrap();
    session.grant(&Scope::Global, 2).unwrap();
    session.invest(&Scope::Global, "focus").unwrap();

    let state = session.load(&Scope::Global).unwrap();
    assert_eq!(state.budget, 1);
    assert_eq!(state.effects().value(&EffectKind::XpMultiplier), 10.0);

    let err = session
        .author(&Scope::Global, "node add", |state| {
            state.add_node(SkillNode::new("focus", "Again", EffectKind::TaskXpBonus))
        })
        .unwrap_err();
    assert!(matches!(err, StError::Graph(_)));
}

#[test]
fn budget_sources_account_for_spent_points() {
    let fixture = ScopeFixture::new();
    fixture.seed(&fresh_state(chain_graph(Scope::Global), 2));
    let session = fixture.session();
    session.invest(&Scope::Global, "a").unwrap();
    session.invest(&Scope::Global, "a").unwrap();

    let state = session
        .apply_budget_source(&Scope::Global, &LevelBudget::new(1, 1).at_level(4))
        .unwrap();
    assert_eq!(state.budget, 3);

    let state = session
        .apply_budget_source(&Scope::Global, &FixedBudget(1))
        .unwrap();
    assert_eq!(state.budget, 0);

    let state = session.set_budget(&Scope::Global, 9).unwrap();
    assert_eq!(state.budget, 9);
}

#[test]
fn snapshot_import_into_another_scope() {
    let fixture = ScopeFixture::new();
    fixture.seed(&fresh_state(chain_graph(Scope::Global), 4));
    let session = fixture.session();
    session.invest(&Scope::Global, "a").unwrap();

    let path = fixture.root.join("export/global.yaml");
    let snapshot = ScopeSnapshot::from_state(&session.load(&Scope::Global).unwrap());
    snapshot.write_to(&path, SnapshotFormat::from_path(&path)).unwrap();

    let target = Scope::category("work");
    let imported = ScopeSnapshot::read_from(&path, SnapshotFormat::Yaml)
        .unwrap()
        .into_state(Some(&target))
        .unwrap();
    session.replace(imported).unwrap();

    let work = session.load(&target).unwrap();
    assert_eq!(work.ledger.points("a"), 1);
    assert_eq!(work.budget, 3);
    assert!(work.graph.nodes().all(|node| node.scope == target));
}
