//! Errors surfaced by the copy orchestrator.

use thiserror::Error;

use super::request::{SourceKind, TargetKind};
use crate::gateway::BlobCopyStatus;

/// Errors surfaced while copying a disk.
#[derive(Debug, Error)]
pub enum CopyError<GatewayError>
where
    GatewayError: std::error::Error + 'static,
{
    /// Raised for kind pairings that are not implemented.
    #[error("{from} to {to} copy is not implemented")]
    UnsupportedCombination {
        /// Requested source kind.
        from: SourceKind,
        /// Requested target kind.
        to: TargetKind,
    },
    /// Raised when a referenced resource does not exist.
    #[error("{resource} '{name}' not found")]
    NotFound {
        /// Kind of resource that was looked up.
        resource: &'static str,
        /// Name that was looked up.
        name: String,
    },
    /// Raised when the target disk already exists; copies never overwrite.
    #[error("disk '{name}' already exists in resource group '{resource_group}'")]
    AlreadyExists {
        /// Target resource group.
        resource_group: String,
        /// Target disk name.
        name: String,
    },
    /// Raised when the relay blob copy ends in a failure state.
    #[error(
        "relay copy to {blob} ended with status {status}: {}",
        .description.as_deref().unwrap_or("no description reported")
    )]
    CopyFailed {
        /// Relay blob URI.
        blob: String,
        /// Terminal status.
        status: BlobCopyStatus,
        /// Provider description, when reported.
        description: Option<String>,
    },
    /// Raised when the caller cancels the copy.
    #[error("copy cancelled while {stage}")]
    Cancelled {
        /// What the copy was doing when it was cancelled.
        stage: &'static str,
    },
    /// Raised when a gateway call fails.
    #[error("{operation} failed: {source}")]
    Gateway {
        /// Gateway operation that failed.
        operation: &'static str,
        /// Provider-specific error.
        #[source]
        source: GatewayError,
    },
}

impl<GatewayError> CopyError<GatewayError>
where
    GatewayError: std::error::Error + 'static,
{
    /// Returns a closure that wraps a gateway error for `operation`, for use
    /// with `map_err`.
    pub(crate) fn gateway(operation: &'static str) -> impl FnOnce(GatewayError) -> Self {
        move |source| Self::Gateway { operation, source }
    }
}
