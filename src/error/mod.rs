//! Error handling for skilltree.
//!
//! This module provides:
//! - [`GraphError`]: structural violations from loading or authoring a graph
//! - [`RejectReason`]: recoverable refusals of invest/refund transactions
//! - [`StError`]: the crate-level error wrapping both plus I/O and storage
//! - [`ErrorCode`] and [`StructuredError`] for machine-readable output

mod codes;
mod suggestions;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::ErrorCode;
pub use suggestions::suggest_for_error;

/// Structural violation in a skill graph. Returned before any topology is
/// built or changed.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum GraphError {
    #[error("Prerequisite cycle detected: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("Duplicate edge: {parent_id} -> {child_id}")]
    DuplicateEdge { parent_id: String, child_id: String },

    #[error("Node cannot be its own prerequisite: {0}")]
    SelfLoop(String),

    #[error("Edge {parent_id} -> {child_id} references unknown node '{missing}'")]
    DanglingReference {
        parent_id: String,
        child_id: String,
        missing: String,
    },

    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),

    #[error("Node '{node_id}' belongs to scope '{found}', expected '{expected}'")]
    ScopeMismatch {
        node_id: String,
        expected: String,
        found: String,
    },

    #[error(
        "Threshold {min_investment} on {parent_id} -> {child_id} must be between 1 and {parent_max}"
    )]
    InvalidThreshold {
        parent_id: String,
        child_id: String,
        min_investment: u32,
        parent_max: u32,
    },

    #[error("Invalid node '{node_id}': {reason}")]
    InvalidNode { node_id: String, reason: String },

    #[error(
        "Node '{child_id}' holds points but '{parent_id}' has {parent_points} of the {min_investment} required"
    )]
    UnmetPrerequisite {
        parent_id: String,
        child_id: String,
        min_investment: u32,
        parent_points: u32,
    },

    #[error("Node '{node_id}' holds {invested} points, above its cap of {max_investment}")]
    InvestmentExceedsCap {
        node_id: String,
        invested: u32,
        max_investment: u32,
    },

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Edge not found: {parent_id} -> {child_id}")]
    EdgeNotFound { parent_id: String, child_id: String },
}

impl GraphError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Cycle { .. } => ErrorCode::GraphCycle,
            Self::DuplicateEdge { .. } => ErrorCode::DuplicateEdge,
            Self::SelfLoop(_) => ErrorCode::SelfLoop,
            Self::DanglingReference { .. } => ErrorCode::DanglingReference,
            Self::DuplicateNode(_) => ErrorCode::DuplicateNode,
            Self::ScopeMismatch { .. } => ErrorCode::ScopeMismatch,
            Self::InvalidThreshold { .. } => ErrorCode::InvalidThreshold,
            Self::InvalidNode { .. } => ErrorCode::InvalidNode,
            Self::UnmetPrerequisite { .. } => ErrorCode::UnmetPrerequisite,
            Self::InvestmentExceedsCap { .. } => ErrorCode::InvestmentExceedsCap,
            Self::NodeNotFound(_) => ErrorCode::NodeNotFound,
            Self::EdgeNotFound { .. } => ErrorCode::EdgeNotFound,
        }
    }
}

/// Why an invest or refund was refused. The scope state is unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "node_id", rename_all = "snake_case")]
pub enum RejectReason {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Node '{0}' is locked: prerequisites not met")]
    NotAvailable(String),

    #[error("Node '{0}' is already at its maximum investment")]
    AlreadyMaxed(String),

    #[error("Node '{0}' has no points to refund")]
    NothingInvested(String),

    #[error("No unspent points left in this scope")]
    InsufficientBudget,

    #[error("Refund would leave invested node '{0}' with an unmet prerequisite")]
    WouldInvalidateChild(String),
}

impl RejectReason {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NodeNotFound(_) => ErrorCode::NodeNotFound,
            Self::NotAvailable(_) => ErrorCode::NotAvailable,
            Self::AlreadyMaxed(_) => ErrorCode::AlreadyMaxed,
            Self::NothingInvested(_) => ErrorCode::NothingInvested,
            Self::InsufficientBudget => ErrorCode::InsufficientBudget,
            Self::WouldInvalidateChild(_) => ErrorCode::WouldInvalidateChild,
        }
    }
}

/// Main error type for skilltree operations.
#[derive(Error, Debug)]
pub enum StError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Rejected: {0}")]
    Rejected(#[from] RejectReason),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Lock timeout: {0}")]
    LockTimeout(String),

    #[error("Lock failed: {0}")]
    LockFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl StError {
    /// Get the error code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Graph(e) => e.code(),
            Self::Rejected(r) => r.code(),
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) | Self::Yaml(_) | Self::Serialization(_) => ErrorCode::SerializationError,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::MissingConfig(_) => ErrorCode::ConfigMissingRequired,
            Self::ValidationFailed(_) => ErrorCode::ValidationFailed,
            Self::TransactionFailed(_) => ErrorCode::TransactionFailed,
            Self::LockTimeout(_) => ErrorCode::LockTimeout,
            Self::LockFailed(_) => ErrorCode::LockFailed,
            Self::NotFound(_) => ErrorCode::NotFound,
        }
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::Graph(GraphError::NodeNotFound(id)) => Some(serde_json::json!({ "node_id": id })),
            Self::Graph(GraphError::Cycle { path }) => {
                Some(serde_json::json!({ "kind": "cycle", "path": path }))
            }
            Self::Graph(e) => serde_json::to_value(e).ok(),
            Self::Rejected(RejectReason::WouldInvalidateChild(child)) => {
                Some(serde_json::json!({ "child_id": child }))
            }
            Self::Rejected(r) => serde_json::to_value(r).ok(),
            Self::MissingConfig(key) => Some(serde_json::json!({ "config_key": key })),
            _ => None,
        }
    }

    /// True for transaction rejections, which leave state untouched.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_st_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "NODE_NOT_FOUND")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 101)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether this error is potentially recoverable by the user
    pub recoverable: bool,

    /// Error category (e.g., "graph", "transaction", "config")
    pub category: String,
}

impl StructuredError {
    /// Create a new structured error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
            message: message.into(),
        }
    }

    /// Create a structured error from an StError.
    #[must_use]
    pub fn from_st_error(err: &StError) -> Self {
        let code = err.code();
        let context = err.context();
        let suggestion = suggest_for_error(code, context.as_ref());

        Self {
            code,
            numeric_code: code.numeric(),
            message: err.to_string(),
            suggestion,
            context,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
        }
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<StError> for StructuredError {
    fn from(err: StError) -> Self {
        Self::from_st_error(&err)
    }
}

impl From<&StError> for StructuredError {
    fn from(err: &StError) -> Self {
        Self::from_st_error(err)
    }
}

/// Result type alias using StError.
pub type Result<T> = std::result::Result<T, StError>;
