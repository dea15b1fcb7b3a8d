//! Scope services.
//!
//! [`ScopeSession`] runs one operation against a stored scope: it takes the
//! scope's file lock, loads the state, applies the operation, commits the
//! result in one SQLite transaction and appends an investment event. A
//! rejected operation writes nothing.
//!
//! [`ScopeRegistry`] is the in-process counterpart for hosts that keep scope
//! state in memory: one mutex per scope, so writers to different scopes
//! never wait on each other.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{info, warn};

use crate::budget::BudgetSource;
use crate::core::{Scope, ScopeState};
use crate::error::{GraphError, RejectReason, Result, StError};
use crate::storage::{Database, InvestmentEvent, ScopeLock};

/// Result of an accepted invest or refund.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionOutcome {
    pub scope: Scope,
    pub node_id: String,
    /// Points held by the node afterwards.
    pub points: u32,
    /// Unspent points in the scope afterwards.
    pub budget: u32,
    pub event: InvestmentEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Invest,
    Refund,
}

impl Direction {
    const fn delta(self) -> i64 {
        match self {
            Self::Invest => 1,
            Self::Refund => -1,
        }
    }

    const fn verb(self) -> &'static str {
        match self {
            Self::Invest => "invest",
            Self::Refund => "refund",
        }
    }
}

pub struct ScopeSession<'a> {
    db: &'a Database,
    st_root: PathBuf,
    lock_timeout: Duration,
}

impl<'a> ScopeSession<'a> {
    pub fn new(db: &'a Database, st_root: &Path, lock_timeout: Duration) -> Self {
        Self {
            db,
            st_root: st_root.to_path_buf(),
            lock_timeout,
        }
    }

    /// Current state of `scope`, read without taking the lock.
    pub fn load(&self, scope: &Scope) -> Result<ScopeState> {
        self.db.load_scope(scope)
    }

    pub fn invest(&self, scope: &Scope, node_id: &str) -> Result<TransactionOutcome> {
        self.transact(scope, node_id, Direction::Invest)
    }

    pub fn refund(&self, scope: &Scope, node_id: &str) -> Result<TransactionOutcome> {
        self.transact(scope, node_id, Direction::Refund)
    }

    /// Apply an authoring operation (node/edge edits) and commit it.
    pub fn author<F>(&self, scope: &Scope, action: &str, op: F) -> Result<ScopeState>
    where
        F: FnOnce(&ScopeState) -> std::result::Result<ScopeState, GraphError>,
    {
        self.with_locked(scope, |state| {
            let next = op(&state)?;
            Ok((next.clone(), next))
        })
        .inspect(|state| {
            info!(
                scope = %scope,
                action,
                nodes = state.graph.node_count(),
                edges = state.graph.edges().len(),
                "graph updated"
            );
        })
    }

    /// Overwrite the unspent budget of `scope`.
    pub fn set_budget(&self, scope: &Scope, available: u32) -> Result<ScopeState> {
        self.with_locked(scope, |mut state| {
            state.budget = available;
            Ok((state.clone(), state))
        })
    }

    /// Add `points` to the unspent budget of `scope`.
    pub fn grant(&self, scope: &Scope, points: u32) -> Result<ScopeState> {
        self.with_locked(scope, |mut state| {
            state.budget = state.budget.saturating_add(points);
            Ok((state.clone(), state))
        })
    }

    /// Recompute the unspent budget from a [`BudgetSource`], given what the
    /// scope already holds.
    pub fn apply_budget_source(
        &self,
        scope: &Scope,
        source: &dyn BudgetSource,
    ) -> Result<ScopeState> {
        self.with_locked(scope, |mut state| {
            let spent = u32::try_from(state.ledger.total_invested()).unwrap_or(u32::MAX);
            state.budget = source.available(scope, spent);
            Ok((state.clone(), state))
        })
    }

    /// Replace the stored scope wholesale (snapshot import).
    pub fn replace(&self, state: ScopeState) -> Result<ScopeState> {
        let scope = state.scope().clone();
        self.with_locked(&scope, move |_| Ok((state.clone(), state)))
    }

    fn transact(
        &self,
        scope: &Scope,
        node_id: &str,
        direction: Direction,
    ) -> Result<TransactionOutcome> {
        let _lock = ScopeLock::acquire_timeout(&self.st_root, scope, self.lock_timeout)?;
        let state = self.db.load_scope(scope)?;

        let applied = match direction {
            Direction::Invest => state.invest(node_id),
            Direction::Refund => state.refund(node_id),
        };
        let next = applied.map_err(|reason: RejectReason| {
            warn!(scope = %scope, node = node_id, reason = %reason, "{} rejected", direction.verb());
            StError::Rejected(reason)
        })?;

        let event = self
            .db
            .save_scope_with_event(&next, node_id, direction.delta())?;

        info!(
            scope = %scope,
            node = node_id,
            points = next.ledger.points(node_id),
            budget = next.budget,
            "{} committed",
            direction.verb()
        );
        Ok(TransactionOutcome {
            scope: scope.clone(),
            node_id: node_id.to_string(),
            points: next.ledger.points(node_id),
            budget: next.budget,
            event,
        })
    }

    fn with_locked<T, F>(&self, scope: &Scope, op: F) -> Result<T>
    where
        F: FnOnce(ScopeState) -> Result<(ScopeState, T)>,
    {
        let _lock = ScopeLock::acquire_timeout(&self.st_root, scope, self.lock_timeout)?;
        let state = self.db.load_scope(scope)?;
        let (next, out) = op(state)?;
        self.db.save_scope(&next)?;
        Ok(out)
    }
}

/// Thread-safe in-memory scope states.
#[derive(Debug, Default)]
pub struct ScopeRegistry {
    scopes: RwLock<HashMap<Scope, Arc<Mutex<ScopeState>>>>,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a scope's state.
    pub fn insert(&self, state: ScopeState) {
        let scope = state.scope().clone();
        self.scopes
            .write()
            .insert(scope, Arc::new(Mutex::new(state)));
    }

    pub fn remove(&self, scope: &Scope) -> Option<ScopeState> {
        self.scopes
            .write()
            .remove(scope)
            .map(|slot| slot.lock().clone())
    }

    /// A copy of the current state of `scope`.
    pub fn get(&self, scope: &Scope) -> Option<ScopeState> {
        self.slot(scope).map(|slot| slot.lock().clone())
    }

    pub fn scopes(&self) -> Vec<Scope> {
        let mut scopes: Vec<Scope> = self.scopes.read().keys().cloned().collect();
        scopes.sort();
        scopes
    }

    pub fn invest(&self, scope: &Scope, node_id: &str) -> Result<ScopeState> {
        self.update(scope, |state| state.invest(node_id).map_err(StError::from))
    }

    pub fn refund(&self, scope: &Scope, node_id: &str) -> Result<ScopeState> {
        self.update(scope, |state| state.refund(node_id).map_err(StError::from))
    }

    /// Run `op` under the scope's mutex and keep its result on success.
    pub fn update<F>(&self, scope: &Scope, op: F) -> Result<ScopeState>
    where
        F: FnOnce(&ScopeState) -> Result<ScopeState>,
    {
        let slot = self
            .slot(scope)
            .ok_or_else(|| StError::NotFound(format!("scope {scope} is not registered")))?;
        let mut guard = slot.lock();
        let next = op(&guard)?;
        *guard = next.clone();
        Ok(next)
    }

    fn slot(&self, scope: &Scope) -> Option<Arc<Mutex<ScopeState>>> {
        self.scopes.read().get(scope).cloned()
    }
}
