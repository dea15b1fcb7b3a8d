//! Core skill graph engine: topology, ledger, availability, transactions and
//! effect aggregation. Everything here is synchronous, in-memory and free of
//! I/O.

pub mod availability;
pub mod effects;
pub mod graph;
pub mod ledger;
pub mod node;
pub mod transaction;

pub use availability::{compute_status, is_available, missing_prerequisites, NodeStatus};
pub use effects::{aggregate_effects, CombineRule, Difficulty, EffectEntry, EffectKind, EffectTotals};
pub use graph::{load_graph, SkillEdge, SkillGraph};
pub use ledger::{load_ledger, Ledger, LedgerEntry};
pub use node::{NodeUpdate, Scope, SkillNode};
pub use transaction::{invest, refund, validate_ledger, ScopeState};
