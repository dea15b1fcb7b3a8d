//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Graph (authoring/topology) errors
//! - 2xx: Transaction rejections
//! - 3xx: Config errors
//! - 6xx: Storage errors
//! - 8xx: Validation and lock errors
//! - 9xx: Internal errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for machine output.
///
/// Each variant maps to a numeric code (e.g., `NodeNotFound` -> E101).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Graph errors (1xx)
    // ========================================
    /// E101: Node id is not part of the scope's graph
    NodeNotFound,
    /// E102: No edge between the given nodes
    EdgeNotFound,
    /// E103: Prerequisite edges form a cycle
    GraphCycle,
    /// E104: Edge between the same pair already exists
    DuplicateEdge,
    /// E105: Edge points from a node to itself
    SelfLoop,
    /// E106: Edge references a node that does not exist
    DanglingReference,
    /// E107: Node id already exists in the scope
    DuplicateNode,
    /// E108: Node belongs to a different scope
    ScopeMismatch,
    /// E109: Edge threshold outside `[1, parent.max_investment]`
    InvalidThreshold,
    /// E110: Node definition violates its invariants
    InvalidNode,
    /// E111: Invested child would have an unmet prerequisite
    UnmetPrerequisite,
    /// E112: Investment above the node's cap
    InvestmentExceedsCap,

    // ========================================
    // Transaction rejections (2xx)
    // ========================================
    /// E201: Prerequisites not met
    NotAvailable,
    /// E202: Node is at its investment cap
    AlreadyMaxed,
    /// E203: Nothing to refund
    NothingInvested,
    /// E204: No unspent points in the scope
    InsufficientBudget,
    /// E205: Refund would orphan an invested child
    WouldInvalidateChild,

    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E301: Config file not found
    ConfigNotFound,
    /// E302: Config file has invalid syntax or values
    ConfigInvalid,
    /// E303: Required config value is missing
    ConfigMissingRequired,

    // ========================================
    // Storage errors (6xx)
    // ========================================
    /// E601: Failed to read from storage
    StorageReadError,
    /// E602: Failed to write to storage
    StorageWriteError,
    /// E604: Database operation failed
    DatabaseError,
    /// E605: Serialization/deserialization failed
    SerializationError,

    // ========================================
    // Validation errors (8xx)
    // ========================================
    /// E801: Input failed validation
    ValidationFailed,
    /// E851: Failed to acquire scope lock within timeout
    LockTimeout,
    /// E852: Failed to acquire scope lock
    LockFailed,
    /// E853: Storage transaction failed and was rolled back
    TransactionFailed,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E901: Unexpected internal error
    InternalError,
    /// E905: Generic not found (catch-all)
    NotFound,
    /// E906: IO operation failed
    IoError,
}

impl ErrorCode {
    /// Get the numeric error code (e.g., `NodeNotFound` -> 101).
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::NodeNotFound => 101,
            Self::EdgeNotFound => 102,
            Self::GraphCycle => 103,
            Self::DuplicateEdge => 104,
            Self::SelfLoop => 105,
            Self::DanglingReference => 106,
            Self::DuplicateNode => 107,
            Self::ScopeMismatch => 108,
            Self::InvalidThreshold => 109,
            Self::InvalidNode => 110,
            Self::UnmetPrerequisite => 111,
            Self::InvestmentExceedsCap => 112,

            Self::NotAvailable => 201,
            Self::AlreadyMaxed => 202,
            Self::NothingInvested => 203,
            Self::InsufficientBudget => 204,
            Self::WouldInvalidateChild => 205,

            Self::ConfigNotFound => 301,
            Self::ConfigInvalid => 302,
            Self::ConfigMissingRequired => 303,

            Self::StorageReadError => 601,
            Self::StorageWriteError => 602,
            Self::DatabaseError => 604,
            Self::SerializationError => 605,

            Self::ValidationFailed => 801,
            Self::LockTimeout => 851,
            Self::LockFailed => 852,
            Self::TransactionFailed => 853,

            Self::InternalError => 901,
            Self::NotFound => 905,
            Self::IoError => 906,
        }
    }

    /// Get the error code as a formatted string (e.g., "E101").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// Get the default suggestion for this error code.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::NodeNotFound => "Run `st node list` to see the nodes in this scope, or check --scope",
            Self::EdgeNotFound => "Run `st node show <id>` to see the node's prerequisites",
            Self::GraphCycle => "Remove one of the edges in the reported cycle; prerequisites must form a DAG",
            Self::DuplicateEdge => "Each parent/child pair has one threshold. Unlink the edge first to change it",
            Self::SelfLoop => "A node cannot be its own prerequisite",
            Self::DanglingReference => "Create both nodes in the same scope before linking them",
            Self::DuplicateNode => "Choose a different node id or update the existing node",
            Self::ScopeMismatch => "Nodes and edges must belong to the scope they are loaded into",
            Self::InvalidThreshold => "Use a threshold between 1 and the parent's max investment",
            Self::InvalidNode => "Check the node's id, max investment (>= 1) and numeric values",
            Self::UnmetPrerequisite => "Invest in the parent until the threshold is met, or refund the child first",
            Self::InvestmentExceedsCap => "Refund points from the node before lowering its cap",

            Self::NotAvailable => "Invest in the node's prerequisites first. Run `st status` to see what is locked",
            Self::AlreadyMaxed => "This node is at its cap; invest elsewhere",
            Self::NothingInvested => "Only nodes holding points can be refunded",
            Self::InsufficientBudget => "Earn more points or refund another node. Run `st budget show`",
            Self::WouldInvalidateChild => "Refund the dependent child node first",

            Self::ConfigNotFound => "Run `st init` to create a configuration, or pass --config <path>",
            Self::ConfigInvalid => "Check TOML syntax and ST_* environment variables",
            Self::ConfigMissingRequired => "Set the required value in config.toml or via its ST_* variable",

            Self::StorageReadError => "Check file permissions and ensure the storage path is accessible",
            Self::StorageWriteError => "Check disk space and write permissions on the storage directory",
            Self::DatabaseError => "The skill database may be damaged. Export scopes and re-initialize",
            Self::SerializationError => "The data format may be corrupted. Check input data for validity",

            Self::ValidationFailed => "Review the reported problem and correct the input",
            Self::LockTimeout => "Another process is modifying this scope. Wait and retry",
            Self::LockFailed => "Failed to acquire the scope lock. Check for stale lock files",
            Self::TransactionFailed => "The write was rolled back. Check error details and retry",

            Self::InternalError => "An unexpected error occurred. Please report this issue with full error output",
            Self::NotFound => "The requested resource was not found. Check the path or identifier",
            Self::IoError => "File operation failed. Check path exists and permissions are correct",
        }
    }

    /// Check if this error is potentially recoverable by the user.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::DatabaseError | Self::SerializationError | Self::InternalError
        )
    }

    /// Get the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "graph",
            2 => "transaction",
            3 => "config",
            6 => "storage",
            8 => "validation",
            9 => "internal",
            _ => "unknown",
        }
    }

    /// Iterate over all error codes.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::NodeNotFound,
            Self::EdgeNotFound,
            Self::GraphCycle,
            Self::DuplicateEdge,
            Self::SelfLoop,
            Self::DanglingReference,
            Self::DuplicateNode,
            Self::ScopeMismatch,
            Self::InvalidThreshold,
            Self::InvalidNode,
            Self::UnmetPrerequisite,
            Self::InvestmentExceedsCap,
            Self::NotAvailable,
            Self::AlreadyMaxed,
            Self::NothingInvested,
            Self::InsufficientBudget,
            Self::WouldInvalidateChild,
            Self::ConfigNotFound,
            Self::ConfigInvalid,
            Self::ConfigMissingRequired,
            Self::StorageReadError,
            Self::StorageWriteError,
            Self::DatabaseError,
            Self::SerializationError,
            Self::ValidationFailed,
            Self::LockTimeout,
            Self::LockFailed,
            Self::TransactionFailed,
            Self::InternalError,
            Self::NotFound,
            Self::IoError,
        ]
        .into_iter()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}
