//! Error types for the category engine

use crate::types::CategoryId;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for category operations
pub type Result<T> = std::result::Result<T, CategoryError>;

/// Errors that can occur in category operations
#[derive(Debug, Error)]
pub enum CategoryError {
    /// Store not initialized at the given path
    #[error("category store not initialized at {path}")]
    NotInitialized { path: PathBuf },

    /// Category not found
    #[error("category not found: {id}")]
    CategoryNotFound { id: CategoryId },

    /// A reorder submission failed validation for one sibling group
    #[error("invalid ranks for group {group}: {violation}")]
    InvalidRanks {
        group: CategoryId,
        violation: RankViolation,
    },

    /// Ordering is not allowed for the listing the client was viewing
    #[error("ordering disabled: {reason}")]
    OrderingDisabled { reason: OrderingDisabledReason },

    /// Another submission committed to the group first
    #[error("group {group} changed concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        group: CategoryId,
        expected: u64,
        actual: u64,
    },

    /// Strict mode requires a version for every touched group
    #[error("missing version for group {group}")]
    MissingGroupVersion { group: CategoryId },

    /// Configuration could not be loaded
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Lock is held by another process
    #[error("lock busy - another operation in progress")]
    LockBusy,

    /// Lock timeout
    #[error("lock timeout after {elapsed_ms}ms")]
    LockTimeout { elapsed_ms: u64 },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CategoryError {
    /// Create an invalid ranks error
    pub fn invalid_ranks(group: CategoryId, violation: RankViolation) -> Self {
        Self::InvalidRanks { group, violation }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this is a retryable error
    ///
    /// A version conflict is retryable after the client reloads the listing.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::LockBusy | Self::LockTimeout { .. } | Self::VersionConflict { .. }
        )
    }
}

/// The first problem found in a sibling group's submitted ranks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RankViolation {
    /// The same row was submitted twice
    DuplicateEntry { id: CategoryId },
    /// A stored member of the group is absent from the submission
    MissingMember { id: CategoryId },
    /// Two rows claim the same rank
    DuplicateRank { rank: usize },
    /// A rank is not in `0..size`
    RankOutOfRange { id: CategoryId, rank: usize, size: usize },
    /// A single-step move would leave the group
    AtBoundary { id: CategoryId },
}

impl fmt::Display for RankViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateEntry { id } => write!(f, "category {id} submitted more than once"),
            Self::MissingMember { id } => write!(f, "category {id} is missing from the submission"),
            Self::DuplicateRank { rank } => write!(f, "rank {rank} assigned more than once"),
            Self::RankOutOfRange { id, rank, size } => {
                write!(f, "rank {rank} for category {id} is outside 0..{size}")
            }
            Self::AtBoundary { id } => write!(f, "category {id} cannot move past the group edge"),
        }
    }
}

/// Why the listing does not allow reordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingDisabledReason {
    /// Sorted by something other than ascending ordering
    NotSortedByOrdering,
    /// A filter may hide siblings
    Filtered,
    /// Pagination may hide siblings
    Paginated,
}

impl fmt::Display for OrderingDisabledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotSortedByOrdering => "listing is not sorted by ordering ascending",
            Self::Filtered => "listing is filtered",
            Self::Paginated => "listing is paginated",
        };
        f.write_str(text)
    }
}
