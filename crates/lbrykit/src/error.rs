//! Error types for the client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use lbrykit_core::{ClaimRef, CoreError};
use lbrykit_resolve::ResolveError;
use lbrykit_rpc::{DaemonError, RpcError};
use lbrykit_support::SupportError;

/// Errors that can occur during client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Gateway error.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// Resolution error.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Support operation error.
    #[error(transparent)]
    Support(#[from] SupportError),

    /// Malformed reference, name or amount.
    #[error("invalid input: {0}")]
    Core(#[from] CoreError),

    /// A reference an operation depends on did not resolve.
    #[error("not found: {reference}: {reason}")]
    NotFound { reference: ClaimRef, reason: String },

    /// A reference an operation depends on is blocked.
    #[error("{reference} blocked by {}", .channels.join(" ; "))]
    Blocked {
        reference: ClaimRef,
        channels: Vec<String>,
    },
}

/// Failure categories callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Connection refused, timed out or dropped.
    GatewayUnreachable,
    /// The daemon answered with an error, or with something unreadable.
    DaemonProtocolError,
    NotFound,
    /// The claim exists but channels block it.
    Blocked,
    /// Daemon numbers contradict each other.
    DataConsistencyFault,
    /// A support transaction was rejected. Funds are unaffected.
    TransactionFailed,
    InvalidInput,
    /// A worker task crashed.
    Internal,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Rpc(e) => rpc_kind(e),
            Self::Resolve(e) => resolve_kind(e),
            Self::Support(e) => match e {
                SupportError::NotFound { .. } => ErrorKind::NotFound,
                SupportError::Blocked { .. } => ErrorKind::Blocked,
                SupportError::Inconsistent(_) => ErrorKind::DataConsistencyFault,
                SupportError::InvalidInput(_) => ErrorKind::InvalidInput,
                SupportError::TransactionFailed { .. } => ErrorKind::TransactionFailed,
                SupportError::Resolve(e) => resolve_kind(e),
                SupportError::Rpc(e) => rpc_kind(e),
            },
            Self::Core(CoreError::InconsistentSupport { .. }) => ErrorKind::DataConsistencyFault,
            Self::Core(_) => ErrorKind::InvalidInput,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Blocked { .. } => ErrorKind::Blocked,
        }
    }

    /// The daemon's error payload, when the daemon reported one.
    pub fn daemon_error(&self) -> Option<&DaemonError> {
        let rpc = match self {
            Self::Rpc(e) => e,
            Self::Resolve(ResolveError::Rpc(e)) => e,
            Self::Support(SupportError::TransactionFailed { error, .. }) => return Some(error),
            Self::Support(SupportError::Rpc(e)) => e,
            Self::Support(SupportError::Resolve(ResolveError::Rpc(e))) => e,
            _ => return None,
        };
        rpc.daemon_error()
    }
}

fn rpc_kind(e: &RpcError) -> ErrorKind {
    match e {
        RpcError::Unreachable(_) => ErrorKind::GatewayUnreachable,
        RpcError::Daemon(_) | RpcError::InvalidResponse(_) => ErrorKind::DaemonProtocolError,
        RpcError::InvalidRequest(_) | RpcError::Config(_) => ErrorKind::InvalidInput,
    }
}

fn resolve_kind(e: &ResolveError) -> ErrorKind {
    match e {
        ResolveError::InvalidInput(_) => ErrorKind::InvalidInput,
        ResolveError::Rpc(e) => rpc_kind(e),
        ResolveError::Worker(_) => ErrorKind::Internal,
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
