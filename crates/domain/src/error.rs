//! Unified error types for the domain layer
//!
//! Every rejection a progression operation can produce is a variant here, so
//! adapters can map them to user-facing notifications without string parsing.
//! A rejected operation never leaves partial state behind.

use thiserror::Error;

use crate::ids::NodeId;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Entity already present
    #[error("Entity already exists: {entity_type} with id {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },

    /// Node is not reachable from the unlocked set (or the level is zero)
    #[error("Node {0} is not available for unlocking")]
    NodeUnavailable(NodeId),

    /// Every level has already been spent on an unlocked node
    #[error("Unlock budget exhausted: {unlocked}/{level} nodes unlocked")]
    BudgetExhausted { unlocked: usize, level: u32 },

    /// The root node stays unlocked until the level drops to 1
    #[error("Node {0} is the root of its tree and cannot be locked above level 1")]
    ProtectedRoot(NodeId),

    /// Children must be locked before their parent
    #[error("Node {0} has unlocked children; lock them first")]
    HasUnlockedChildren(NodeId),

    /// Locking a node that is not unlocked
    #[error("Node {0} is not unlocked")]
    NotUnlocked(NodeId),

    /// Step level change at either end of the range
    #[error("Already at the {bound} level ({level})")]
    LevelBoundReached { level: u32, bound: &'static str },
}

impl DomainError {
    /// Creates a validation error for malformed input.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create an already exists error
    pub fn already_exists(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity_type,
            id: id.into(),
        }
    }

    /// Create a budget exhausted error
    pub fn budget_exhausted(unlocked: usize, level: u32) -> Self {
        Self::BudgetExhausted { unlocked, level }
    }
}
