//! Error types for support operations.

use thiserror::Error;

use lbrykit_core::{ClaimRef, CoreError, SupportAction, SupportState};
use lbrykit_resolve::ResolveError;
use lbrykit_rpc::{DaemonError, RpcError};

/// Errors that can occur during support operations.
#[derive(Debug, Error)]
pub enum SupportError {
    /// The claim to support could not be located.
    #[error("claim not found: {reference}: {reason}")]
    NotFound { reference: ClaimRef, reason: String },

    /// The claim is withheld by blocking channels.
    #[error("claim {reference} blocked by {}", .channels.join(" ; "))]
    Blocked {
        reference: ClaimRef,
        channels: Vec<String>,
    },

    /// The daemon's numbers contradict each other.
    #[error("data consistency fault: {0}")]
    Inconsistent(CoreError),

    /// Malformed reference or amount.
    #[error("invalid input: {0}")]
    InvalidInput(CoreError),

    /// `support_create` or `support_abandon` was rejected. Nothing changed.
    #[error("transaction failed on {} ({:?}): {error}", .state.claim_id, .action)]
    TransactionFailed {
        /// Stake measured before the attempt.
        state: Box<SupportState>,
        /// The call that was attempted, with its amount.
        action: SupportAction,
        error: DaemonError,
    },

    /// Resolution failed for a reason other than a missing claim.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Gateway failure outside a transaction.
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

impl From<CoreError> for SupportError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InconsistentSupport { .. } => Self::Inconsistent(e),
            other => Self::InvalidInput(other),
        }
    }
}

/// Result type for support operations.
pub type Result<T> = std::result::Result<T, SupportError>;
