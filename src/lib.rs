//! Skill progression graphs.
//!
//! A scope holds a directed acyclic graph of [`core::SkillNode`]s joined by
//! prerequisite [`core::SkillEdge`]s, a ledger of invested points, and an
//! unspent budget. Every operation on [`core::ScopeState`] returns a new
//! state; [`service::ScopeSession`] persists them through [`storage`].

pub mod app;
pub mod budget;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod service;
pub mod storage;
pub mod test_utils;

pub use budget::{BudgetSource, FixedBudget, LevelBudget};
pub use core::{
    aggregate_effects, compute_status, is_available, load_graph, load_ledger,
    missing_prerequisites, EffectKind, EffectTotals, Ledger, NodeStatus, Scope, ScopeState,
    SkillEdge, SkillGraph, SkillNode,
};
pub use error::{GraphError, RejectReason, Result, StError};
pub use service::{ScopeRegistry, ScopeSession, TransactionOutcome};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
