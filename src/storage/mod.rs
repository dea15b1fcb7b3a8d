//! Storage layer for skilltree
//!
//! SQLite holds the graphs, ledgers and budgets of every scope; per-scope
//! file locks serialize writers; snapshots move a scope in and out as JSON
//! or YAML.

pub mod lock;
pub mod migrations;
pub mod snapshot;
pub mod sqlite;

pub use lock::{LockHolder, ScopeLock};
pub use snapshot::{ScopeSnapshot, SnapshotFormat, SNAPSHOT_FORMAT_VERSION};
pub use sqlite::{Database, InvestmentEvent, ScopeSummary};
