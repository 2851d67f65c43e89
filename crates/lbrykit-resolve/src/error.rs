//! Error types for claim resolution.

use thiserror::Error;

use lbrykit_core::CoreError;
use lbrykit_rpc::RpcError;

/// Errors that abort a resolution.
///
/// A claim that does not exist is not an error; it is reported as
/// [`crate::Resolution::NotFound`].
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The reference itself is malformed.
    #[error("invalid reference: {0}")]
    InvalidInput(#[from] CoreError),

    /// The gateway failed or the daemon reported an error.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// A batch worker panicked or was aborted.
    #[error("resolver worker failed: {0}")]
    Worker(String),
}

/// Result type for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;
