//! Talent tree use case errors.

use talent_tree_domain::DomainError;

use crate::entities::progression::StoreError;
use crate::infrastructure::ports::RepoError;

/// Errors surfaced by talent tree use cases.
#[derive(Debug, thiserror::Error)]
pub enum ProgressionError {
    /// The acting user may not perform this operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// A tree rule rejected the request; nothing was changed.
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl ProgressionError {
    pub fn permission(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    /// Whether the request was refused rather than failed.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::PermissionDenied(_) | Self::Domain(_))
    }
}

impl From<StoreError> for ProgressionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotOwner { .. } => Self::PermissionDenied(err.to_string()),
            StoreError::Repo(e) => Self::Repo(e),
        }
    }
}
