//! SQLite database layer

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::{load_graph, load_ledger, LedgerEntry, Scope, ScopeState, SkillEdge, SkillNode};
use crate::error::{Result, StError};
use crate::storage::migrations;

/// SQLite store for skill graphs, ledgers and budgets.
pub struct Database {
    conn: Connection,
    schema_version: u32,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("schema_version", &self.schema_version)
            .finish_non_exhaustive()
    }
}

/// One accepted invest (`delta = 1`) or refund (`delta = -1`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvestmentEvent {
    pub id: String,
    pub scope: String,
    pub node_id: String,
    pub delta: i64,
    pub budget_after: u32,
    pub created_at: String,
}

/// Row counts for one stored scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeSummary {
    pub scope: Scope,
    pub nodes: u32,
    pub invested: u32,
    pub budget: Option<u32>,
}

struct NodeRow {
    id: String,
    title: String,
    description: String,
    effect_kind: String,
    base_value: f64,
    scaling_per_point: f64,
    max_investment: u32,
}

impl Database {
    /// Open database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::configure_pragmas(&conn)?;
        let schema_version = migrations::run_migrations(&conn)?;

        debug!(path = %path.display(), schema_version, "opened database");
        Ok(Self {
            conn,
            schema_version,
        })
    }

    /// Open a private in-memory database (tests, embedding hosts).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let schema_version = migrations::run_migrations(&conn)?;
        Ok(Self {
            conn,
            schema_version,
        })
    }

    /// Get a reference to the connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Current schema version after migrations.
    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    // =========================================================================
    // Scope state
    // =========================================================================

    /// Load graph, ledger and budget of `scope`.
    ///
    /// Ledger rows for nodes that no longer exist are dropped with a warning.
    /// A scope with no rows loads as an empty graph with a budget of 0.
    pub fn load_scope(&self, scope: &Scope) -> Result<ScopeState> {
        let key = scope.key();

        let nodes = self
            .load_node_rows(&key)?
            .into_iter()
            .map(|row| {
                let effect_kind = serde_json::from_str(&row.effect_kind).map_err(|err| {
                    StError::Serialization(format!("effect kind of node {}: {err}", row.id))
                })?;
                Ok(SkillNode {
                    id: row.id,
                    title: row.title,
                    description: row.description,
                    effect_kind,
                    base_value: row.base_value,
                    scaling_per_point: row.scaling_per_point,
                    max_investment: row.max_investment,
                    scope: scope.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let edges = self.load_edges(&key)?;
        let graph = load_graph(scope.clone(), nodes, edges)?;

        let mut entries = Vec::new();
        for entry in self.load_investments(&key)? {
            if graph.contains(&entry.node_id) {
                entries.push(entry);
            } else {
                warn!(
                    scope = %scope,
                    node = %entry.node_id,
                    points = entry.points,
                    "dropping investment for unknown node"
                );
            }
        }
        let ledger = load_ledger(entries);
        let budget = self.get_budget(scope)?.unwrap_or(0);

        Ok(ScopeState::new(graph, ledger, budget)?)
    }

    /// Replace every stored row of the state's scope in one transaction.
    pub fn save_scope(&self, state: &ScopeState) -> Result<()> {
        let key = state.scope().key();
        let now = Utc::now().to_rfc3339();

        let tx = self.conn.unchecked_transaction()?;
        Self::write_scope(&tx, &key, state, &now)?;
        tx.commit()
            .map_err(|err| StError::TransactionFailed(format!("commit scope {key}: {err}")))?;
        debug!(
            scope = %key,
            nodes = state.graph.node_count(),
            invested = state.ledger.total_invested(),
            budget = state.budget,
            "saved scope"
        );
        Ok(())
    }

    /// Replace the scope's rows and append one history entry for an accepted
    /// invest (`delta = 1`) or refund (`delta = -1`). Both land in the same
    /// transaction: either the new state and its event are stored, or neither.
    pub fn save_scope_with_event(
        &self,
        state: &ScopeState,
        node_id: &str,
        delta: i64,
    ) -> Result<InvestmentEvent> {
        let key = state.scope().key();
        let now = Utc::now().to_rfc3339();
        let event = InvestmentEvent {
            id: Uuid::new_v4().to_string(),
            scope: key.clone(),
            node_id: node_id.to_string(),
            delta,
            budget_after: state.budget,
            created_at: now.clone(),
        };

        let tx = self.conn.unchecked_transaction()?;
        Self::write_scope(&tx, &key, state, &now)?;
        tx.execute(
            "INSERT INTO investment_events (id, scope, node_id, delta, budget_after, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                event.id,
                event.scope,
                event.node_id,
                event.delta,
                event.budget_after,
                event.created_at,
            ],
        )?;
        tx.commit()
            .map_err(|err| StError::TransactionFailed(format!("commit scope {key}: {err}")))?;
        debug!(
            scope = %key,
            node = node_id,
            delta,
            budget = state.budget,
            event = %event.id,
            "saved scope with event"
        );
        Ok(event)
    }

    fn write_scope(conn: &Connection, key: &str, state: &ScopeState, now: &str) -> Result<()> {
        conn.execute("DELETE FROM skill_investments WHERE scope = ?", [key])?;
        conn.execute("DELETE FROM skill_edges WHERE scope = ?", [key])?;
        conn.execute("DELETE FROM skill_nodes WHERE scope = ?", [key])?;

        for node in state.graph.nodes() {
            let effect_kind = serde_json::to_string(&node.effect_kind)?;
            conn.execute(
                "INSERT INTO skill_nodes (
                    scope, id, title, description, effect_kind, base_value,
                    scaling_per_point, max_investment, updated_at
                 ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    key,
                    node.id,
                    node.title,
                    node.description,
                    effect_kind,
                    node.base_value,
                    node.scaling_per_point,
                    node.max_investment,
                    now,
                ],
            )?;
        }

        for edge in state.graph.edges() {
            conn.execute(
                "INSERT INTO skill_edges (scope, parent_id, child_id, min_investment)
                 VALUES (?, ?, ?, ?)",
                params![key, edge.parent_id, edge.child_id, edge.min_investment],
            )?;
        }

        for (node_id, points) in state.ledger.iter() {
            conn.execute(
                "INSERT INTO skill_investments (scope, node_id, points) VALUES (?, ?, ?)",
                params![key, node_id, points],
            )?;
        }

        Self::upsert_budget(conn, key, state.budget, now)
    }

    fn load_node_rows(&self, key: &str) -> Result<Vec<NodeRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, effect_kind, base_value, scaling_per_point, max_investment \
             FROM skill_nodes WHERE scope = ? ORDER BY id",
        )?;
        let rows = stmt.query_map([key], node_row)?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn load_edges(&self, key: &str) -> Result<Vec<SkillEdge>> {
        let mut stmt = self.conn.prepare(
            "SELECT parent_id, child_id, min_investment FROM skill_edges \
             WHERE scope = ? ORDER BY parent_id, child_id",
        )?;
        let rows = stmt.query_map([key], |row| {
            Ok(SkillEdge {
                parent_id: row.get(0)?,
                child_id: row.get(1)?,
                min_investment: row.get(2)?,
            })
        })?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn load_investments(&self, key: &str) -> Result<Vec<LedgerEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT node_id, points FROM skill_investments WHERE scope = ? ORDER BY node_id",
        )?;
        let rows = stmt.query_map([key], |row| {
            Ok(LedgerEntry {
                node_id: row.get(0)?,
                points: row.get(1)?,
            })
        })?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    // =========================================================================
    // Budgets
    // =========================================================================

    /// Stored unspent points of `scope`, if a budget was ever set.
    pub fn get_budget(&self, scope: &Scope) -> Result<Option<u32>> {
        let budget = self
            .conn
            .query_row(
                "SELECT available FROM scope_budgets WHERE scope = ?",
                [scope.key()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(budget)
    }

    pub fn set_budget(&self, scope: &Scope, available: u32) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        Self::upsert_budget(&self.conn, &scope.key(), available, &now)
    }

    fn upsert_budget(conn: &Connection, key: &str, available: u32, now: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO scope_budgets (scope, available, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(scope) DO UPDATE SET
                available = excluded.available,
                updated_at = excluded.updated_at",
            params![key, available, now],
        )?;
        Ok(())
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Most recent events of `scope`, newest first.
    pub fn list_events(&self, scope: &Scope, limit: usize) -> Result<Vec<InvestmentEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, scope, node_id, delta, budget_after, created_at FROM investment_events \
             WHERE scope = ? ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![scope.key(), limit], |row| {
            Ok(InvestmentEvent {
                id: row.get(0)?,
                scope: row.get(1)?,
                node_id: row.get(2)?,
                delta: row.get(3)?,
                budget_after: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    /// Every scope that has nodes or a stored budget.
    pub fn list_scopes(&self) -> Result<Vec<ScopeSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.scope,
                    (SELECT COUNT(*) FROM skill_nodes n WHERE n.scope = s.scope),
                    (SELECT COALESCE(SUM(points), 0) FROM skill_investments i WHERE i.scope = s.scope),
                    (SELECT available FROM scope_budgets b WHERE b.scope = s.scope)
             FROM (SELECT scope FROM skill_nodes UNION SELECT scope FROM scope_budgets) s",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, Option<u32>>(3)?,
            ))
        })?;

        let mut results = Vec::new();
        for row in rows {
            let (key, nodes, invested, budget) = row?;
            let scope = key
                .parse::<Scope>()
                .map_err(|err| StError::Serialization(format!("stored scope: {err}")))?;
            results.push(ScopeSummary {
                scope,
                nodes,
                invested,
                budget,
            });
        }
        results.sort_by(|a, b| a.scope.cmp(&b.scope));
        Ok(results)
    }

    fn configure_pragmas(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;",
        )?;
        Ok(())
    }
}

fn node_row(row: &Row<'_>) -> rusqlite::Result<NodeRow> {
    Ok(NodeRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        effect_kind: row.get(3)?,
        base_value: row.get(4)?,
        scaling_per_point: row.get(5)?,
        max_investment: row.get(6)?,
    })
}
