use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;

use crate::core::{
    load_graph, EffectKind, Ledger, Scope, ScopeState, SkillEdge, SkillGraph, SkillNode,
};
use crate::service::ScopeSession;
use crate::storage::Database;

/// Isolated root directory with a migrated database.
pub struct ScopeFixture {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub db: Database,
}

impl ScopeFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let db = Database::open(root.join("skilltree.db")).expect("Failed to open database");
        println!("[FIXTURE] Created root: {root:?}");
        Self { temp_dir, root, db }
    }

    pub fn session(&self) -> ScopeSession<'_> {
        ScopeSession::new(&self.db, &self.root, Duration::from_millis(500))
    }

    /// Store `state` as the scope's current contents.
    pub fn seed(&self, state: &ScopeState) {
        self.db.save_scope(state).expect("Failed to seed scope");
    }
}

impl Default for ScopeFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Two-node chain `a -> b` with `min_investment = 2`:
/// `a` is additive XP (base 5, +5 per point, cap 3), `b` a streak flag.
pub fn chain_graph(scope: Scope) -> SkillGraph {
    load_graph(
        scope.clone(),
        vec![
            SkillNode::new("a", "Apprentice", EffectKind::XpMultiplier)
                .with_values(5.0, 5.0)
                .with_max_investment(3)
                .with_scope(scope.clone()),
            SkillNode::new("b", "Backup", EffectKind::StreakProtection).with_scope(scope),
        ],
        vec![SkillEdge::new("a", "b", 2)],
    )
    .expect("chain graph is valid")
}

/// A small focus tree with two roots, a diamond and a multiplicative leaf.
///
/// ```text
/// focus ──1──> deep_work ──2──> flow
/// habits ─1──> routine ───1──> flow
/// flow ───1──> mastery
/// ```
pub fn focus_tree(scope: Scope) -> SkillGraph {
    let node = |id: &str, title: &str, kind: EffectKind, base: f64, scaling: f64, max: u32| {
        SkillNode::new(id, title, kind)
            .with_values(base, scaling)
            .with_max_investment(max)
            .with_scope(scope.clone())
    };
    load_graph(
        scope.clone(),
        vec![
            node("focus", "Focus", EffectKind::XpMultiplier, 5.0, 5.0, 3),
            node("habits", "Habits", EffectKind::TaskXpBonus, 2.0, 2.0, 3),
            node("deep_work", "Deep Work", EffectKind::XpMultiplier, 10.0, 0.0, 1),
            node("routine", "Routine", EffectKind::CollectionSlotIncrease, 1.0, 1.0, 2),
            node("flow", "Flow", EffectKind::StreakProtection, 0.0, 0.0, 1),
            node(
                "mastery",
                "Mastery",
                EffectKind::CategoryXpMultiplier {
                    category_id: "fitness".to_string(),
                },
                20.0,
                0.0,
                1,
            ),
        ],
        vec![
            SkillEdge::new("focus", "deep_work", 1),
            SkillEdge::new("habits", "routine", 1),
            SkillEdge::new("deep_work", "flow", 1),
            SkillEdge::new("routine", "flow", 2),
            SkillEdge::new("flow", "mastery", 1),
        ],
    )
    .expect("focus tree is valid")
}

/// Scope state around `graph` with an empty ledger.
pub fn fresh_state(graph: SkillGraph, budget: u32) -> ScopeState {
    ScopeState::new(graph, Ledger::new(), budget).expect("empty ledger is valid")
}
