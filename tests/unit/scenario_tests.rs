//! Worked examples for investing, refunding, and aggregating.

use skilltree::core::{EffectKind, Ledger, Scope, ScopeState, SkillEdge, SkillNode, load_graph};
use skilltree::test_utils::fixtures::{chain_graph, fresh_state};
use skilltree::test_utils::logging::TestLogger;
use skilltree::RejectReason;

#[test]
fn two_invests_spend_the_budget_and_scale_the_value() {
    let mut log = TestLogger::new("two_invests_spend_the_budget_and_scale_the_value");
    let graph = load_graph(
        Scope::Global,
        vec![
            SkillNode::new("a", "A", EffectKind::TaskXpBonus)
                .with_values(5.0, 5.0)
                .with_max_investment(3),
        ],
        vec![],
    )
    .unwrap();
    let state = fresh_state(graph, 2);

    log.step("invest(a) twice");
    let state = state.invest("a").unwrap().invest("a").unwrap();
    assert_eq!(state.ledger.points("a"), 2);
    assert_eq!(state.budget, 0);

    log.step("aggregate");
    let effects = state.effects();
    log.log_state("effects", &effects);
    assert_eq!(effects.value(&EffectKind::TaskXpBonus), 10.0);
    log.pass();
}

#[test]
fn child_is_locked_until_parent_reaches_threshold() {
    let mut log = TestLogger::new("child_is_locked_until_parent_reaches_threshold");
    let state = fresh_state(chain_graph(Scope::Global), 5);

    log.step("invest(b) with a=0");
    assert_eq!(
        state.invest("b").unwrap_err(),
        RejectReason::NotAvailable("b".into())
    );

    log.step("invest(a) once, b still locked");
    let state = state.invest("a").unwrap();
    assert_eq!(
        state.invest("b").unwrap_err(),
        RejectReason::NotAvailable("b".into())
    );

    log.step("invest(a) again, b unlocks");
    let state = state.invest("a").unwrap();
    let state = state.invest("b").unwrap();
    assert_eq!(state.ledger.points("b"), 1);
    assert_eq!(state.budget, 2);
    log.pass();
}

#[test]
fn refund_that_would_strand_a_child_is_rejected() {
    let graph = chain_graph(Scope::Global);
    let ledger = Ledger::from_entries([("a", 2), ("b", 1)]);
    let state = ScopeState::new(graph, ledger, 0).unwrap();

    let err = state.refund("a").unwrap_err();
    assert_eq!(err, RejectReason::WouldInvalidateChild("b".into()));
    assert_eq!(state.ledger.points("a"), 2);
    assert_eq!(state.budget, 0);

    // Refunding the child first frees the parent.
    let state = state.refund("b").unwrap().refund("a").unwrap();
    assert_eq!(state.ledger.points("a"), 1);
    assert_eq!(state.budget, 2);
}

#[test]
fn invest_without_budget_leaves_ledger_unchanged() {
    let state = fresh_state(chain_graph(Scope::Global), 0);
    assert_eq!(
        state.invest("a").unwrap_err(),
        RejectReason::InsufficientBudget
    );
    assert!(state.ledger.is_empty());
    assert_eq!(state.budget, 0);
}

#[test]
fn multiplicative_effects_compound() {
    let graph = load_graph(
        Scope::Global,
        vec![
            SkillNode::new("x", "X", EffectKind::XpMultiplier).with_values(10.0, 0.0),
            SkillNode::new("y", "Y", EffectKind::XpMultiplier).with_values(20.0, 0.0),
        ],
        vec![],
    )
    .unwrap();
    let state = fresh_state(graph, 2).invest("x").unwrap().invest("y").unwrap();

    let total = state.effects().value(&EffectKind::XpMultiplier);
    assert!((total - 32.0).abs() < 1e-9, "expected 32.0, got {total}");
    assert!((state.effects().xp_factor() - 1.32).abs() < 1e-9);
}

#[test]
fn deleting_an_invested_parent_refunds_and_unlocks_children() {
    let mut log = TestLogger::new("deleting_an_invested_parent_refunds_and_unlocks_children");
    let graph = chain_graph(Scope::Global);
    let state = ScopeState::new(graph, Ledger::from_entries([("a", 2)]), 1).unwrap();

    log.step("delete_node(a)");
    let state = state.delete_node("a").unwrap();
    assert_eq!(state.budget, 3);
    assert!(!state.graph.contains("a"));
    assert!(state.graph.edges().is_empty());

    log.step("b is now a root");
    let status = state.status();
    assert_eq!(status.len(), 1);
    assert!(status[0].is_available);
    let state = state.invest("b").unwrap();
    assert!(state.effects().is_active(&EffectKind::StreakProtection));
    log.pass();
}

#[test]
fn maxed_node_rejects_further_investment() {
    let graph = chain_graph(Scope::Global);
    let state = ScopeState::new(graph, Ledger::from_entries([("a", 3)]), 4).unwrap();
    assert_eq!(
        state.invest("a").unwrap_err(),
        RejectReason::AlreadyMaxed("a".into())
    );
    let status = state.status();
    let a = status.iter().find(|s| s.node_id == "a").unwrap();
    assert!(a.is_maxed);
}

#[test]
fn refund_of_uninvested_node_is_rejected() {
    let state = fresh_state(chain_graph(Scope::Global), 1);
    assert_eq!(
        state.refund("a").unwrap_err(),
        RejectReason::NothingInvested("a".into())
    );
    assert_eq!(
        state.refund("ghost").unwrap_err(),
        RejectReason::NodeNotFound("ghost".into())
    );
}

#[test]
fn child_with_two_parents_needs_both() {
    let graph = load_graph(
        Scope::Global,
        vec![
            SkillNode::new("p", "P", EffectKind::TaskXpBonus).with_max_investment(2),
            SkillNode::new("q", "Q", EffectKind::TaskXpBonus),
            SkillNode::new("c", "C", EffectKind::StreakProtection),
        ],
        vec![SkillEdge::new("p", "c", 2), SkillEdge::new("q", "c", 1)],
    )
    .unwrap();
    let state = fresh_state(graph, 5).invest("p").unwrap().invest("p").unwrap();
    assert!(state.invest("c").is_err());
    let state = state.invest("q").unwrap().invest("c").unwrap();
    assert_eq!(state.ledger.points("c"), 1);
}
