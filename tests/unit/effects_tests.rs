use skilltree::core::{
    aggregate_effects, CombineRule, Difficulty, EffectKind, Ledger, Scope, ScopeState,
};
use skilltree::test_utils::fixtures::focus_tree;

fn invested_tree() -> ScopeState {
    let ledger = Ledger::from_entries([
        ("focus", 3),
        ("deep_work", 1),
        ("habits", 2),
        ("routine", 2),
        ("flow", 1),
        ("mastery", 1),
    ]);
    ScopeState::new(focus_tree(Scope::Global), ledger, 0).unwrap()
}

#[test]
fn each_kind_combines_by_its_rule() {
    let effects = invested_tree().effects();

    // focus: 5 + 5*2 = 15, deep_work: 10, compounded: 1.15 * 1.10
    let xp = effects.value(&EffectKind::XpMultiplier);
    assert!((xp - 26.5).abs() < 1e-9, "xp {xp}");

    // habits: 2 + 2*1
    assert_eq!(effects.value(&EffectKind::TaskXpBonus), 4.0);
    // routine: 1 + 1*1
    assert_eq!(effects.value(&EffectKind::CollectionSlotIncrease), 2.0);
    assert!(effects.is_active(&EffectKind::StreakProtection));
    assert_eq!(
        effects.value(&EffectKind::CategoryXpMultiplier {
            category_id: "fitness".into()
        }),
        20.0
    );
    assert_eq!(effects.len(), 5);
}

#[test]
fn uninvested_nodes_contribute_nothing() {
    let state = ScopeState::new(focus_tree(Scope::Global), Ledger::new(), 3).unwrap();
    let effects = state.effects();
    assert!(effects.is_empty());
    assert_eq!(effects.value(&EffectKind::XpMultiplier), 0.0);
    assert_eq!(effects.xp_factor(), 1.0);
    assert!(!effects.is_active(&EffectKind::StreakProtection));
}

#[test]
fn aggregation_is_repeatable() {
    let state = invested_tree();
    let first = aggregate_effects(&state.graph, &state.ledger);
    let second = aggregate_effects(&state.graph, &state.ledger);
    assert_eq!(first, second);
}

#[test]
fn qualified_kinds_are_kept_apart() {
    let easy = EffectKind::DifficultyXpBonus {
        difficulty: Difficulty::Easy,
    };
    let hard = EffectKind::DifficultyXpBonus {
        difficulty: Difficulty::Hard,
    };
    assert_ne!(easy, hard);
    assert_eq!(easy.rule(), CombineRule::Additive);
    assert_eq!(hard.to_string(), "difficulty_xp_bonus:hard");
}

#[test]
fn effects_serialize_as_entries() {
    let effects = invested_tree().effects();
    let json = serde_json::to_value(&effects).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), effects.len());
    assert!(entries.iter().all(|entry| entry.get("rule").is_some()));
}
